//! Admin credential check.

use axum::Json;
use serde_json::{json, Value};

/// Confirms the caller passed the admin guard.
pub async fn check() -> Json<Value> {
    Json(json!({ "status": "authenticated" }))
}
