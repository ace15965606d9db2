//! HTTP request handlers.

/// Training page endpoints.
pub mod page;
/// Tag management endpoints.
pub mod tag;
pub(crate) mod validate;

use crate::error::HttpError;
use aikinote_core::models::ApiResponse;
use aikinote_core::AppError;
use axum::Json;
use serde::Deserialize;

/// `?user_id=` for endpoints that only need the caller.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

pub(crate) fn success<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::Success(data))
}

/// Envelope-shaped 404 for unknown routes.
pub async fn not_found() -> HttpError {
    AppError::NotFound.into()
}
