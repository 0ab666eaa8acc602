//! Cookie-bound session authentication.
//!
//! This crate provides the stateful core of session login:
//! - Random session tokens bound to an application-chosen session key
//! - The `key::token` cookie encoding
//! - A pluggable [`SessionStore`] holding each key's list of sessions
//! - Lazy expiration: stale sessions are pruned on the next read or write
//! - Constant-time token validation
//!
//! HTTP framework integration lives in `tessera-server`.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_session::{MemoryStore, RequestContext, SessionConfig, SessionManager};
//!
//! let config = SessionConfig::new().with_ttl(Duration::from_secs(3600));
//! let manager = SessionManager::new(config, MemoryStore::new())?;
//!
//! // Login handler
//! let mut headers = HeaderMap::new();
//! manager.set(&RequestContext::new(), &mut headers, "alice@example.com").await?;
//!
//! // Later, on each request
//! let identity = manager.validate(&RequestContext::new(), cookie_value).await;
//! ```

pub mod codec;
mod config;
mod context;
mod error;
mod manager;
mod memory;
mod prune;
mod session;
mod store;
mod token;

pub use codec::{DELIMITER, ResponseSink};
pub use config::{
    DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH, DEFAULT_TTL, SameSitePolicy, SessionConfig,
    load_config_file,
};
pub use context::RequestContext;
pub use error::{ConfigError, CookieError, Error, Result, StoreError};
pub use manager::SessionManager;
pub use memory::MemoryStore;
pub use prune::prune;
pub use session::{Identity, Session, SessionList};
pub use store::SessionStore;
pub use token::{SessionToken, TOKEN_BYTES, TOKEN_LEN};
