//! HTTP error mapping for API handlers.

use crate::AppError;
use aikinote_core::models::ApiResponse;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Error returned by handlers; rendered as a failure envelope.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound => Self::new(StatusCode::NOT_FOUND, "Not found"),
            AppError::BadRequest(message) => Self::new(StatusCode::BAD_REQUEST, message),
            AppError::StorageMessage(ref message) => {
                tracing::error!("Storage error: {}", message);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            other => {
                tracing::error!("Internal error: {:?}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::failure(self.message));
        (self.status, body).into_response()
    }
}
