//! Chat completion, API key and model routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use database::validation::validate_model;
use orchestrator::{normalize_model, ChatError, ChatReply};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::error::{status_for, ApiError, Result};
use crate::session::SessionId;
use crate::state::AppState;

/// Body of the save-key action.
#[derive(Debug, Deserialize)]
pub struct SaveKeyRequest {
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
}

/// Body of the model actions.
#[derive(Debug, Deserialize)]
pub struct ModelRequest {
    #[serde(default)]
    pub model: Option<String>,
}

/// Run a chat completion.
///
/// Always answers with `{responseText, imageData, error}`.
pub async fn complete(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<ChatReply>) {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            info!(error = %rejection, "Rejected chat request body");
            let err = ChatError::InvalidRequest("Invalid request body, missing 'contents'".into());
            return (status_for(&err), Json(ChatReply::failure(err.to_string())));
        }
    };

    match state.orchestrator.complete(session.as_str(), &body).await {
        Ok(reply) => (StatusCode::OK, Json(reply)),
        Err(err) => {
            let status = status_for(&err);
            if status.is_server_error() {
                error!(status = status.as_u16(), error = ?err, "Chat request failed");
            } else {
                info!(status = status.as_u16(), error = %err, "Chat request rejected");
            }
            (status, Json(ChatReply::failure(err.to_string())))
        }
    }
}

/// Save or clear the caller's own API key.
pub async fn save_key(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    body: std::result::Result<Json<SaveKeyRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let key = body.ok().and_then(|Json(body)| body.api_key);

    let stored = state
        .orchestrator
        .save_user_key(session.as_str(), key.as_deref())
        .await
        .map_err(ApiError::message)?;

    let message = if stored {
        "API Key saved successfully for this session."
    } else {
        "API key cleared"
    };
    Ok(Json(json!({ "message": message })))
}

/// The model the session's next chat request would use.
pub async fn current_model(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<Value>> {
    let model = state
        .orchestrator
        .current_model(session.as_str())
        .await
        .map_err(ApiError::message)?;

    Ok(Json(json!({ "currentModel": model })))
}

/// Set the session's model override.
pub async fn update_model(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    body: std::result::Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let model = checked_model(body)?;

    let model = state
        .orchestrator
        .select_model(session.as_str(), model.as_deref())
        .await
        .map_err(ApiError::message)?;

    Ok(Json(json!({
        "message": "Model updated successfully for this session.",
        "newModel": model,
    })))
}

/// Overwrite the global default model. Admin only.
pub async fn update_default_model(
    State(state): State<AppState>,
    body: std::result::Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let model = checked_model(body)?;

    let model = state
        .orchestrator
        .update_default_model(model.as_deref())
        .await
        .map_err(|err| match err {
            ChatError::Persistence(detail) => {
                error!(detail = %detail, "Failed to update global default model");
                ApiError::Message {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Failed to update global default model due to an internal error."
                        .to_string(),
                }
            }
            other => ApiError::message(other),
        })?;

    Ok(Json(json!({
        "message": "Global default model updated successfully.",
        "newGlobalDefaultModel": model,
    })))
}

/// List upstream models with the server key.
///
/// Failures answer with an empty list and the mapped status.
pub async fn debug_models(State(state): State<AppState>) -> (StatusCode, Json<Vec<Value>>) {
    match state.orchestrator.available_models().await {
        Ok(models) => (StatusCode::OK, Json(models)),
        Err(err) => {
            error!(error = ?err, "Failed to list models");
            (status_for(&err), Json(Vec::new()))
        }
    }
}

/// Pull the model out of the body and reject malformed identifiers.
///
/// Blank models are passed through as `None` so the orchestrator reports
/// the endpoint-specific "cannot be empty" message.
fn checked_model(
    body: std::result::Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Option<String>> {
    let model = normalize_model(body.ok().and_then(|Json(body)| body.model).as_deref());

    match model {
        Some(model) => validate_model(&model)
            .map(Some)
            .map_err(|err| ApiError::Message {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            }),
        None => Ok(None),
    }
}
