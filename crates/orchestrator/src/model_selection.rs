//! Model resolution for chat requests.

/// Model used when neither the session nor the global setting names one.
pub const FALLBACK_MODEL: &str = "qwen/qwen-2-72b-instruct";

/// Global default written on first start.
pub const SEED_DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

/// Pick the model for a request.
///
/// Session override first, then the global default, then the fallback.
/// Blank values count as absent.
pub fn resolve_model(
    session_model: Option<&str>,
    global_default: Option<&str>,
    fallback: &str,
) -> String {
    session_model
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or_else(|| global_default.map(str::trim).filter(|m| !m.is_empty()))
        .unwrap_or(fallback)
        .to_string()
}

/// Trim a model identifier, returning `None` if it is blank.
pub fn normalize_model(model: Option<&str>) -> Option<String> {
    model
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_override_wins() {
        assert_eq!(
            resolve_model(Some("anthropic/claude-3-haiku"), Some("openai/gpt-4o"), FALLBACK_MODEL),
            "anthropic/claude-3-haiku"
        );
    }

    #[test]
    fn test_global_default_used() {
        assert_eq!(
            resolve_model(None, Some("openai/gpt-4o"), FALLBACK_MODEL),
            "openai/gpt-4o"
        );
        assert_eq!(
            resolve_model(Some("  "), Some("openai/gpt-4o"), FALLBACK_MODEL),
            "openai/gpt-4o"
        );
    }

    #[test]
    fn test_fallback_used() {
        assert_eq!(resolve_model(None, None, FALLBACK_MODEL), FALLBACK_MODEL);
        assert_eq!(resolve_model(None, Some(""), FALLBACK_MODEL), FALLBACK_MODEL);
    }

    #[test]
    fn test_normalize_model() {
        assert_eq!(normalize_model(Some(" a/b ")), Some("a/b".to_string()));
        assert_eq!(normalize_model(Some("   ")), None);
        assert_eq!(normalize_model(None), None);
    }
}
