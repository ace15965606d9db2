//! Tag management HTTP handlers.

use super::validate::require_user;
use super::{success, UserQuery};
use crate::{error::HttpError, AppError, AppState};
use aikinote_core::models::{ApiResponse, CreateTagRequest, Tag, TagList};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

/// List the caller's registered tags.
///
/// # Errors
/// Returns an error for a blank user or storage failure.
pub async fn list_tags(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TagList>>, HttpError> {
    let Query(query) = query?;
    let user_id = require_user(&query.user_id)?;
    let tags = state.db.tags.list_for_user(user_id)?;
    Ok(success(TagList { tags }))
}

/// Register a tag; an existing tag with the same category and name is returned.
///
/// # Errors
/// Returns an error for a blank user or name, or storage failure.
pub async fn create_tag(
    State(state): State<AppState>,
    payload: Result<Json<CreateTagRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Tag>>, HttpError> {
    let Json(req) = payload?;
    let user_id = require_user(&req.user_id)?;
    let tag = state.db.tags.create(user_id, &req.name, req.category)?;
    Ok(success(tag))
}

/// Remove one of the caller's tags.
///
/// # Errors
/// Returns not found when the tag is missing or owned by someone else.
pub async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<bool>>, HttpError> {
    let Query(query) = query?;
    let user_id = require_user(&query.user_id)?;
    if state.db.tags.delete(user_id, &id)? {
        Ok(success(true))
    } else {
        Err(AppError::NotFound.into())
    }
}
