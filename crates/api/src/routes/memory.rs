//! Memory fact routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::validation::validate_fact;
use database::{memory_fact, MemoryFact};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

const MISSING_FACT: &str = "Missing or empty 'fact_text' in request body";

/// Body of the create and update actions.
#[derive(Debug, Deserialize)]
pub struct FactRequest {
    #[serde(default)]
    pub fact_text: Option<String>,
}

/// List every memory fact.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<MemoryFact>>> {
    let facts = memory_fact::list_facts(state.db.pool())
        .await
        .map_err(|e| ApiError::internal("Failed to retrieve memory facts", e))?;
    Ok(Json(facts))
}

/// Create a memory fact.
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<FactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MemoryFact>)> {
    let text = fact_text(body)?;

    let fact = memory_fact::create_fact(state.db.pool(), &text)
        .await
        .map_err(|e| ApiError::internal("Failed to add memory fact", e))?;

    info!(id = fact.id, "Added memory fact");
    Ok((StatusCode::CREATED, Json(fact)))
}

/// Replace the text of a memory fact.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<FactRequest>, JsonRejection>,
) -> Result<Json<MemoryFact>> {
    let text = fact_text(body)?;

    let fact = memory_fact::update_fact(state.db.pool(), id, &text)
        .await
        .map_err(|e| {
            ApiError::from_db(e, "Failed to update memory fact", || not_found(id))
        })?;

    info!(id, "Updated memory fact");
    Ok(Json(fact))
}

/// Delete a memory fact.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    memory_fact::delete_fact(state.db.pool(), id)
        .await
        .map_err(|e| {
            ApiError::from_db(e, "Failed to delete memory fact", || not_found(id))
        })?;

    info!(id, "Deleted memory fact");
    Ok(Json(json!({
        "message": format!("Memory fact with id {} deleted successfully", id),
        "deleted_id": id,
    })))
}

fn fact_text(body: std::result::Result<Json<FactRequest>, JsonRejection>) -> Result<String> {
    let text = body
        .ok()
        .and_then(|Json(body)| body.fact_text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING_FACT.to_string()))?;

    Ok(validate_fact(&text)?)
}

fn not_found(id: i64) -> String {
    format!("Memory fact with id {} not found", id)
}
