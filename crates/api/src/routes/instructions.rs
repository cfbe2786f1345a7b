//! Training instruction routes.
//!
//! Listing and adding visible instructions is public. Everything else sits
//! behind the admin guard.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::validation::validate_instruction;
use database::{training_instruction, TrainingInstruction};
use persona_core::SEED_INSTRUCTIONS;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;

const MISSING_TEXT: &str = "Missing or empty 'instructionText' in request body";

/// Body of the add actions.
#[derive(Debug, Deserialize)]
pub struct InstructionRequest {
    #[serde(rename = "instructionText", default)]
    pub instruction_text: Option<String>,
}

/// Compact view for the admin debug listing.
#[derive(Debug, Serialize)]
pub struct DebugInstruction {
    pub id: i64,
    pub text: String,
    pub hidden: bool,
}

impl From<TrainingInstruction> for DebugInstruction {
    fn from(instruction: TrainingInstruction) -> Self {
        Self {
            id: instruction.id,
            text: instruction.instruction_text,
            hidden: instruction.is_hidden,
        }
    }
}

/// List visible instructions.
pub async fn list_visible(State(state): State<AppState>) -> Result<Json<Vec<TrainingInstruction>>> {
    let instructions = training_instruction::list_visible(state.db.pool())
        .await
        .map_err(|e| ApiError::internal("Failed to retrieve visible instructions", e))?;
    Ok(Json(instructions))
}

/// Add a visible instruction.
pub async fn create_visible(
    State(state): State<AppState>,
    body: std::result::Result<Json<InstructionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TrainingInstruction>)> {
    create(&state, body, false, "Failed to add instruction").await
}

/// List every instruction. Admin only.
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<TrainingInstruction>>> {
    let instructions = training_instruction::list_all(state.db.pool())
        .await
        .map_err(|e| ApiError::internal("Failed to retrieve all instructions", e))?;
    Ok(Json(instructions))
}

/// Compact listing of every instruction. Admin only.
pub async fn debug(State(state): State<AppState>) -> Result<Json<Vec<DebugInstruction>>> {
    let instructions = training_instruction::list_all(state.db.pool())
        .await
        .map_err(|e| ApiError::internal("Failed to retrieve debug instructions", e))?;
    Ok(Json(instructions.into_iter().map(DebugInstruction::from).collect()))
}

/// Add a hidden instruction. Admin only.
pub async fn add_hidden(
    State(state): State<AppState>,
    body: std::result::Result<Json<InstructionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TrainingInstruction>)> {
    create(&state, body, true, "Failed to add hidden instruction").await
}

/// Set the hidden flag of an instruction. Admin only.
pub async fn toggle_visibility(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<TrainingInstruction>> {
    let is_hidden = body
        .ok()
        .and_then(|Json(body)| body.get("is_hidden").and_then(Value::as_bool))
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Missing or invalid 'is_hidden' (boolean) in request body".to_string(),
            )
        })?;

    let instruction = training_instruction::set_hidden(state.db.pool(), id, is_hidden)
        .await
        .map_err(|e| {
            ApiError::from_db(e, "Failed to set instruction visibility", || not_found(id))
        })?;

    info!(id, is_hidden, "Changed instruction visibility");
    Ok(Json(instruction))
}

/// Delete an instruction. Admin only.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    training_instruction::delete_instruction(state.db.pool(), id)
        .await
        .map_err(|e| ApiError::from_db(e, "Failed to delete instruction", || not_found(id)))?;

    info!(id, "Deleted instruction");
    Ok(Json(json!({
        "message": format!("Instruction with id {} deleted successfully", id),
        "deleted_id": id,
    })))
}

/// Insert any missing built-in instructions as hidden. Admin only.
pub async fn init_hardcoded(State(state): State<AppState>) -> Result<Json<Value>> {
    let report = training_instruction::seed_missing(state.db.pool(), SEED_INSTRUCTIONS)
        .await
        .map_err(|e| ApiError::internal("Failed to initialize hardcoded instructions", e))?;

    Ok(Json(json!({
        "message": format!(
            "Hardcoded instruction check complete. Found {} existing. Added {} new (as hidden). Total instructions now: {}.",
            report.existing, report.added, report.total
        ),
    })))
}

/// Delete every instruction and re-seed the built-in set. Admin only.
pub async fn reset_all(State(state): State<AppState>) -> Result<Json<Value>> {
    warn!("Resetting all training instructions");

    let (deleted, report) =
        training_instruction::reset_and_seed(state.db.pool(), SEED_INSTRUCTIONS)
            .await
            .map_err(|e| ApiError::internal("Failed to reset instructions", e))?;

    Ok(Json(json!({
        "message": format!(
            "Successfully deleted {} instructions and re-initialized hardcoded ones. Added {} hardcoded (as hidden). Total instructions now: {}.",
            deleted, report.added, report.total
        ),
    })))
}

async fn create(
    state: &AppState,
    body: std::result::Result<Json<InstructionRequest>, JsonRejection>,
    is_hidden: bool,
    context: &'static str,
) -> Result<(StatusCode, Json<TrainingInstruction>)> {
    let text = body
        .ok()
        .and_then(|Json(body)| body.instruction_text)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING_TEXT.to_string()))?;
    let text = validate_instruction(&text)?;

    let instruction = training_instruction::create_instruction(state.db.pool(), &text, is_hidden)
        .await
        .map_err(|e| ApiError::internal(context, e))?;

    info!(id = instruction.id, is_hidden, "Added instruction");
    Ok((StatusCode::CREATED, Json(instruction)))
}

fn not_found(id: i64) -> String {
    format!("Training instruction with id {} not found", id)
}
