use crate::error::AppError;

/// Returns the trimmed value, or a validation error carrying `msg` when the
/// field is absent or blank.
pub fn required(value: Option<String>, msg: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::validation(msg)),
    }
}

/// Like [`required`] but blank input counts as absent instead of an error.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
