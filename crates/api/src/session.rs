//! Session cookie middleware.
//!
//! Every request gets a [`SessionId`] extension. The id comes from the
//! `relay_session` cookie when it holds a valid UUID; otherwise a new one is
//! minted and set on the response.

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::{AppState, CookieSettings};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "relay_session";

/// Opaque session identifier for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attach a session id to the request, minting one if needed.
pub async fn ensure_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = session_from_headers(request.headers());
    let is_new = existing.is_none();
    let session_id = existing.unwrap_or_else(|| Uuid::new_v4().to_string());

    if is_new {
        debug!("Minted new session");
    }

    request
        .extensions_mut()
        .insert(SessionId(session_id.clone()));

    let mut response = next.run(request).await;

    if is_new {
        match HeaderValue::from_str(&cookie_header(&session_id, state.cookies)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(err) => warn!(error = %err, "Failed to build session cookie"),
        }
    }

    response
}

/// Read a valid session id from the `Cookie` headers.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(|id| id.to_string())
}

/// Render the `Set-Cookie` value for a session.
pub fn cookie_header(session_id: &str, settings: CookieSettings) -> String {
    let max_age = u64::from(settings.max_age_days) * 24 * 60 * 60;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, session_id, max_age
    );
    if settings.secure {
        cookie.push_str("; Secure");
    }
    cookie
}
