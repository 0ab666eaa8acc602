//! axum integration for tessera sessions.
//!
//! Provides the request-interception side of session authentication: cookie
//! extraction, enforcing and permissive middleware, and extractors that hand
//! the validated [`Identity`] to handlers.
//!
//! # Example
//!
//! ```ignore
//! use tessera_server::{AuthState, optional_session, require_session};
//! use tessera_session::{MemoryStore, SessionConfig, SessionManager};
//!
//! let manager = SessionManager::new(SessionConfig::default(), MemoryStore::new())?;
//! let auth = AuthState::new(manager);
//!
//! let app = Router::new()
//!     .route("/account", get(account))
//!     .layer(middleware::from_fn_with_state(auth.clone(), require_session))
//!     .merge(
//!         Router::new()
//!             .route("/", get(home))
//!             .layer(middleware::from_fn_with_state(auth, optional_session)),
//!     );
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod state;

pub use auth::{
    AuthIdentity, MAX_SESSION_COOKIES, MaybeIdentity, optional_session, require_session,
    session_cookie, session_cookies,
};
pub use config::{AuthConfig, DEFAULT_REDIRECT_PATH, RedirectHandler};
pub use error::{ErrorResponse, Result, ServerError};
pub use state::AuthState;

pub use tessera_session::{Identity, RequestContext, SessionManager};
