//! Admin basic-auth guard.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;
use crate::state::{AdminCredentials, AppState};

/// Reject requests without valid admin credentials.
pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !is_authorized(&state.admin, request.headers()) {
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

/// Whether the headers carry the admin's basic-auth credentials.
pub fn is_authorized(admin: &AdminCredentials, headers: &HeaderMap) -> bool {
    match basic_credentials(headers) {
        Some((username, password)) => username == admin.username && password == admin.password,
        None => false,
    }
}

/// Decode `Authorization: Basic <base64(user:pass)>`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn admin() -> AdminCredentials {
        AdminCredentials {
            username: "admin".to_string(),
            password: "s3cret:with-colon".to_string(),
        }
    }

    #[test]
    fn test_basic_credentials() {
        let encoded = STANDARD.encode("admin:s3cret:with-colon");
        let parsed = basic_credentials(&headers(&format!("Basic {}", encoded)));
        assert_eq!(
            parsed,
            Some(("admin".to_string(), "s3cret:with-colon".to_string()))
        );
    }

    #[test]
    fn test_is_authorized() {
        let good = STANDARD.encode("admin:s3cret:with-colon");
        assert!(is_authorized(&admin(), &headers(&format!("basic {}", good))));

        let bad = STANDARD.encode("admin:wrong");
        assert!(!is_authorized(&admin(), &headers(&format!("Basic {}", bad))));
        assert!(!is_authorized(&admin(), &headers("Bearer token")));
        assert!(!is_authorized(&admin(), &headers("Basic not-base64!")));
        assert!(!is_authorized(&admin(), &HeaderMap::new()));
    }
}
