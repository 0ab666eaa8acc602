//! State shared by the authentication middleware.

use std::sync::Arc;

use tessera_session::SessionManager;

use crate::config::AuthConfig;

/// State handed to the middleware via `from_fn_with_state`.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Session manager used for validation.
    pub manager: SessionManager,

    /// Middleware configuration.
    pub config: Arc<AuthConfig>,
}

impl AuthState {
    /// Create state with the default configuration.
    pub fn new(manager: SessionManager) -> Self {
        Self {
            manager,
            config: Arc::new(AuthConfig::default()),
        }
    }

    /// Replace the middleware configuration.
    pub fn with_config(mut self, config: AuthConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.manager.config().cookie_name
    }
}
