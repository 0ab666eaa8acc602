//! Middleware configuration.

use std::sync::Arc;

use axum::{
    extract::Request,
    response::{IntoResponse, Redirect, Response},
};

/// Path the default redirect handler sends unauthenticated requests to.
pub const DEFAULT_REDIRECT_PATH: &str = "/";

/// Called with the original request when enforcing-mode validation fails.
pub type RedirectHandler = Arc<dyn Fn(Request) -> Response + Send + Sync>;

/// Configuration for the authentication middleware.
#[derive(Clone)]
pub struct AuthConfig {
    /// Produces the response for unauthenticated requests on enforced routes.
    pub redirect: RedirectHandler,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig").finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Create a config that redirects to `/`.
    pub fn new() -> Self {
        Self {
            redirect: redirect_to(DEFAULT_REDIRECT_PATH),
        }
    }

    /// Replace the redirect handler.
    pub fn with_redirect<F>(mut self, handler: F) -> Self
    where
        F: Fn(Request) -> Response + Send + Sync + 'static,
    {
        self.redirect = Arc::new(handler);
        self
    }

    /// Redirect unauthenticated requests to `path` (303 See Other).
    pub fn with_redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect = redirect_to(path);
        self
    }
}

fn redirect_to(path: impl Into<String>) -> RedirectHandler {
    let path = path.into();
    Arc::new(move |_request: Request| Redirect::to(&path).into_response())
}
