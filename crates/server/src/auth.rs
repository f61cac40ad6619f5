//! Authentication: a bearer-token tower layer guarding the translation endpoint, and a
//! session-token extractor guarding the admin surface.
//!
//! Adapted from the teacher's OAuth/JWT `AuthLayer` down to this gateway's simpler
//! bearer-token and session-token schemes.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::response::Response;
use http::request::{Parts, Request};
use llm::GatewayError;
use secrecy::ExposeSecret;
use tower::{Layer, Service};

use crate::error::error_response;
use crate::state::AppState;

/// Rejects any request whose `Authorization: Bearer <token>` header doesn't match the
/// currently configured `localApiKey`.
#[derive(Clone)]
pub struct BearerAuthLayer {
    state: AppState,
}

impl BearerAuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuthService { inner, state: self.state.clone() }
    }
}

#[derive(Clone)]
pub struct BearerAuthService<S> {
    inner: S,
    state: AppState,
}

impl<S> Service<Request<Body>> for BearerAuthService<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let state = self.state.clone();

        Box::pin(async move {
            if bearer_matches(&req, &state) {
                inner.call(req).await
            } else {
                Ok(error_response(&GatewayError::Unauthorized))
            }
        })
    }
}

fn bearer_matches(req: &Request<Body>, state: &AppState) -> bool {
    let Some(header) = req.headers().get(http::header::AUTHORIZATION).and_then(|value| value.to_str().ok()) else {
        return false;
    };
    let Some(token) = header.strip_prefix("Bearer ") else {
        return false;
    };

    let config = state.config.current();
    token == config.local_api_key.expose_secret()
}

/// Extractor proving the request carries a live admin session in `x-session-token`.
pub struct AdminSession;

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts.headers.get("x-session-token").and_then(|value| value.to_str().ok());

        match token {
            Some(token) if state.sessions.validate(token) => Ok(AdminSession),
            _ => Err(error_response(&GatewayError::Unauthorized)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use config::{Configuration, ConfigStore};
    use dispatch::{DispatchQueue, ResponseCache};
    use llm::UpstreamClient;

    use super::*;
    use crate::stats::Stats;

    fn test_state(local_api_key: &str) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let bootstrap = Configuration::new(
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            "upstream-secret".to_string(),
            "gemini-2.0-flash".to_string(),
            local_api_key.to_string(),
            "bootstrap-password".to_string(),
        )
        .unwrap();
        let config = Arc::new(ConfigStore::load(dir.path().join("config.json"), bootstrap).unwrap());

        AppState {
            config,
            sessions: Arc::new(config::SessionStore::new()),
            cache: ResponseCache::default(),
            queue: Arc::new(DispatchQueue::new(3, std::time::Duration::from_millis(200))),
            client: UpstreamClient::new(),
            stats: Arc::new(Stats::new()),
            started_at: Instant::now(),
        }
    }

    #[test]
    fn accepts_matching_bearer_token() {
        let state = test_state("secret-token");
        let req = Request::builder()
            .header(http::header::AUTHORIZATION, "Bearer secret-token")
            .body(Body::empty())
            .unwrap();

        assert!(bearer_matches(&req, &state));
    }

    #[test]
    fn rejects_mismatched_bearer_token() {
        let state = test_state("secret-token");
        let req = Request::builder()
            .header(http::header::AUTHORIZATION, "Bearer wrong-token")
            .body(Body::empty())
            .unwrap();

        assert!(!bearer_matches(&req, &state));
    }

    #[test]
    fn rejects_missing_authorization_header() {
        let state = test_state("secret-token");
        let req = Request::builder().body(Body::empty()).unwrap();

        assert!(!bearer_matches(&req, &state));
    }
}
