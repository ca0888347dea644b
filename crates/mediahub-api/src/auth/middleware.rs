use crate::error::HttpAppError;
use crate::middleware::get_request_id;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use mediahub_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Invalid API Key";

#[derive(Clone, Debug)]
pub struct AuthState {
    pub api_keys: Vec<String>,
}

impl AuthState {
    pub fn new(api_keys: Vec<String>) -> Self {
        Self { api_keys }
    }

    /// Every configured key is compared so the timing does not reveal which one matched.
    fn accepts(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .fold(false, |matched, key| secure_compare(key, token) | matched)
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = bearer_token(&request).is_some_and(|token| auth_state.accepts(token));

    if !authorized {
        tracing::debug!(
            request_id = ?get_request_id(&request),
            path = %request.uri().path(),
            has_header = request.headers().contains_key(header::AUTHORIZATION),
            "Rejected request without a valid API key"
        );
        return HttpAppError(AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("abc", "abc"));
        assert!(!secure_compare("abc", "abd"));
        assert!(!secure_compare("abc", "abcd"));
    }

    #[test]
    fn test_accepts_any_configured_key() {
        let state = AuthState::new(vec!["one".to_string(), "two".to_string()]);
        assert!(state.accepts("two"));
        assert!(!state.accepts("three"));
        assert!(!AuthState::new(Vec::new()).accepts("one"));
    }

    #[test]
    fn test_bearer_token_requires_scheme() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), Some("secret"));

        let request = Request::builder()
            .header(header::AUTHORIZATION, "Basic secret")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), None);

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_token(&request), None);
    }
}
