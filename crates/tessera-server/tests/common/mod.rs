//! Common test utilities for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware,
    response::Response,
    routing::{get, post},
};
use cookie::Cookie;
use tower::ServiceExt;

use tessera_server::{
    AuthConfig, AuthIdentity, AuthState, MaybeIdentity, ServerError, optional_session,
    require_session, session_cookies,
};
use tessera_session::{RequestContext, SessionConfig, SessionManager, SessionStore};

/// Router state for the test application.
#[derive(Clone)]
pub struct TestState {
    pub auth: AuthState,
    /// Number of times the protected handler ran.
    pub protected_hits: Arc<AtomicUsize>,
}

/// A small login/logout application wired with both middleware modes.
pub struct TestApp {
    pub state: TestState,
    router: Router,
}

impl TestApp {
    /// Build the application over `store`.
    pub fn new(store: impl SessionStore + 'static, session: SessionConfig) -> Result<Self> {
        Self::with_auth_config(store, session, AuthConfig::default())
    }

    /// Build the application with a custom middleware configuration.
    pub fn with_auth_config(
        store: impl SessionStore + 'static,
        session: SessionConfig,
        auth_config: AuthConfig,
    ) -> Result<Self> {
        let manager = SessionManager::new(session, store)?;
        let state = TestState {
            auth: AuthState::new(manager).with_config(auth_config),
            protected_hits: Arc::new(AtomicUsize::new(0)),
        };
        let router = build_router(state.clone());
        Ok(Self { state, router })
    }

    /// Send a request through the application.
    pub async fn send(&self, request: Request) -> Result<Response> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    /// Log in as `key` and return the `Cookie` header value to replay.
    pub async fn login(&self, key: &str) -> Result<String> {
        let response = self.send(post_request(&format!("/login/{}", key), None)).await?;
        anyhow::ensure!(
            response.status() == StatusCode::OK,
            "login failed: {}",
            response.status()
        );
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .ok_or_else(|| anyhow::anyhow!("no Set-Cookie header"))?
            .to_str()?;
        let cookie = Cookie::parse(set_cookie.to_string())?;
        Ok(format!("{}={}", cookie.name(), cookie.value()))
    }

    /// How many times the protected handler has run.
    pub fn protected_hits(&self) -> usize {
        self.state.protected_hits.load(Ordering::SeqCst)
    }
}

fn build_router(state: TestState) -> Router {
    let protected = Router::new()
        .route("/account", get(account))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/", get(home))
        .route("/logout", post(logout))
        .route("/logout/device", post(logout_device))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            optional_session,
        ));

    Router::new()
        .route("/login/{key}", post(login))
        .merge(protected)
        .merge(public)
        .with_state(state)
}

async fn login(
    State(state): State<TestState>,
    Path(key): Path<String>,
) -> Result<(HeaderMap, &'static str), ServerError> {
    let mut headers = HeaderMap::new();
    state
        .auth
        .manager
        .set(&RequestContext::new(), &mut headers, &key)
        .await?;
    Ok((headers, "logged in"))
}

async fn account(State(state): State<TestState>, AuthIdentity(identity): AuthIdentity) -> String {
    state.protected_hits.fetch_add(1, Ordering::SeqCst);
    format!("account:{}", identity.key)
}

async fn home(MaybeIdentity(identity): MaybeIdentity) -> String {
    match identity {
        Some(identity) => format!("hello {}", identity.key),
        None => "hello anonymous".to_string(),
    }
}

async fn logout(
    State(state): State<TestState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<(HeaderMap, &'static str), ServerError> {
    let manager = &state.auth.manager;
    manager.clear(&RequestContext::new(), &identity.key).await?;

    let mut headers = HeaderMap::new();
    manager.expire_cookie(&mut headers)?;
    Ok((headers, "logged out"))
}

async fn logout_device(
    State(state): State<TestState>,
    request_headers: HeaderMap,
) -> Result<(HeaderMap, &'static str), ServerError> {
    let manager = &state.auth.manager;
    for value in session_cookies(&request_headers, state.auth.cookie_name()) {
        if manager.clear_current(&RequestContext::new(), &value).await? {
            break;
        }
    }

    let mut headers = HeaderMap::new();
    manager.expire_cookie(&mut headers)?;
    Ok((headers, "logged out"))
}

/// Build a GET request, optionally carrying a `Cookie` header.
pub fn get_request(uri: &str, cookie: Option<&str>) -> Request {
    request("GET", uri, cookie)
}

/// Build a POST request, optionally carrying a `Cookie` header.
pub fn post_request(uri: &str, cookie: Option<&str>) -> Request {
    request("POST", uri, cookie)
}

fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Read a response body as a string.
pub async fn body_string(response: Response) -> Result<String> {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(body.to_vec())?)
}
