//! Request validation shared by page and tag handlers.

use aikinote_core::{AppError, MAX_TITLE_CHARS};

/// Trimmed user id, or a bad request when blank.
pub(super) fn require_user(user_id: &str) -> Result<&str, AppError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }
    Ok(trimmed)
}

/// Titles are required and at most [`MAX_TITLE_CHARS`] characters.
pub(super) fn validate_title(title: &str) -> Result<(), AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}
