//! Session authentication middleware.
//!
//! Two modes share one validation path:
//! - [`require_session`] (enforcing): unauthenticated requests are handed to
//!   the configured redirect handler and never reach the route.
//! - [`optional_session`] (permissive): unauthenticated requests reach the
//!   route anonymously.
//!
//! On success both insert the [`Identity`] into request extensions.
//!
//! # Security
//!
//! The reason a request is unauthenticated (no cookie, malformed cookie,
//! unknown key, wrong token, expired session) is never exposed.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::COOKIE, request::Parts},
    middleware::Next,
    response::Response,
};
use cookie::Cookie;
use tessera_session::{Identity, RequestContext};
use tracing::trace;

use crate::error::ServerError;
use crate::state::AuthState;

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Enforcing middleware: reject requests without a valid session.
///
/// ```ignore
/// Router::new()
///     .route("/account", get(account))
///     .layer(middleware::from_fn_with_state(auth_state, require_session))
/// ```
pub async fn require_session(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = credentials(&state, &request);
    match authenticate(&state, presented).await {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        None => {
            trace!(path = %request.uri().path(), "Unauthenticated request redirected");
            (state.config.redirect)(request)
        }
    }
}

/// Permissive middleware: attach the identity when there is one.
pub async fn optional_session(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = credentials(&state, &request);
    match authenticate(&state, presented).await {
        Some(identity) => {
            request.extensions_mut().insert(identity);
        }
        None => {
            // Nothing upstream gets to pre-seed an identity
            request.extensions_mut().remove::<Identity>();
        }
    }
    next.run(request).await
}

/// Most same-named session cookies tried for one request.
pub const MAX_SESSION_COOKIES: usize = 4;

/// Validate extracted credentials, once per candidate cookie.
///
/// Takes owned values: the request body is not `Sync`, so no borrow of the
/// request may be held across the store lookup.
async fn authenticate(
    state: &AuthState,
    credentials: Option<(Vec<String>, RequestContext)>,
) -> Option<Identity> {
    let (values, ctx) = credentials?;
    for value in &values {
        if let Some(identity) = state.manager.validate(&ctx, value).await {
            return Some(identity);
        }
    }
    None
}

/// The session cookie values and the context bounding their lookup.
///
/// A [`RequestContext`] placed in the request extensions by an outer layer
/// is honoured; otherwise the lookup is unbounded.
fn credentials(state: &AuthState, request: &Request) -> Option<(Vec<String>, RequestContext)> {
    let values = session_cookies(request.headers(), state.cookie_name());
    if values.is_empty() {
        return None;
    }
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();
    Some((values, ctx))
}

/// Find the value of the first cookie called `name` in the request headers.
///
/// Looks through every `Cookie` header and ignores unparsable pairs.
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    session_cookies(headers, name).into_iter().next()
}

/// Every value of the cookie called `name`, in header order.
///
/// Clients send one cookie per matching path, so a stale cookie scoped to a
/// longer path can precede the live one. At most [`MAX_SESSION_COOKIES`]
/// values are returned.
pub fn session_cookies(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|cookie| cookie.ok())
        .filter(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .take(MAX_SESSION_COOKIES)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Extractors
// ─────────────────────────────────────────────────────────────────────────────

/// The authenticated identity; rejects with 401 when there is none.
///
/// Use behind [`require_session`], or behind [`optional_session`] on
/// handlers that need a login.
#[derive(Debug, Clone)]
pub struct AuthIdentity(pub Identity);

impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthIdentity)
            .ok_or_else(|| ServerError::Unauthorized("no active session".to_string()))
    }
}

/// The identity if the request is authenticated, `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(parts.extensions.get::<Identity>().cloned()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
