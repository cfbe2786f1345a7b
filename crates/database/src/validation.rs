//! Input validation for persona records and session fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Value contains characters that are not allowed.
    InvalidCharacters(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::InvalidCharacters(field) => {
                write!(f, "{} contains invalid characters", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for a memory fact.
pub const MAX_FACT_LENGTH: usize = 4000;

/// Maximum allowed length for a training instruction.
pub const MAX_INSTRUCTION_LENGTH: usize = 4000;

/// Maximum allowed length for model identifiers.
pub const MAX_MODEL_LENGTH: usize = 128;

/// Trim a free-text value and check it is non-empty and within `max` chars.
///
/// Returns the trimmed value.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(value.to_string())
}

/// Validate a memory fact text.
pub fn validate_fact(value: &str) -> Result<String, ValidationError> {
    validate_text("fact_text", value, MAX_FACT_LENGTH)
}

/// Validate a training instruction text.
pub fn validate_instruction(value: &str) -> Result<String, ValidationError> {
    validate_text("instructionText", value, MAX_INSTRUCTION_LENGTH)
}

/// Validate a model identifier such as "openai/gpt-4o".
///
/// Model identifiers must not contain whitespace or control characters.
pub fn validate_model(value: &str) -> Result<String, ValidationError> {
    let model = validate_text("model", value, MAX_MODEL_LENGTH)?;

    if model.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidCharacters("model".to_string()));
    }

    Ok(model)
}
