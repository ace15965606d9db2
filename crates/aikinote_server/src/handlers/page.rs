//! Training page HTTP handlers.

use super::validate::{require_user, validate_title};
use super::{success, UserQuery};
use crate::{error::HttpError, AppError, AppState};
use aikinote_core::filter::{self, FilterCriteria};
use aikinote_core::models::tag::parse_tags_csv;
use aikinote_core::models::*;
use aikinote_core::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

fn normalized_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
}

fn list_zone(query: &ListPagesQuery) -> Result<DateZone, AppError> {
    match query.utc_offset_minutes {
        None => Ok(DateZone::utc()),
        Some(minutes) => DateZone::from_offset_minutes(minutes).ok_or_else(|| {
            AppError::BadRequest(format!("utc_offset_minutes out of range: {}", minutes))
        }),
    }
}

fn list_criteria(query: &ListPagesQuery) -> FilterCriteria {
    FilterCriteria::default()
        .with_query(query.query.clone().unwrap_or_default())
        .with_tags(query.tags.as_deref().map(parse_tags_csv).unwrap_or_default())
        .with_date(query.date)
}

/// List a user's pages, newest first.
///
/// `query`, `tags` and `date` narrow the result before `offset`/`limit` are
/// applied. `limit` defaults to 50 and is capped at 100.
///
/// # Errors
/// Returns an error for a blank user, an out-of-range `utc_offset_minutes`,
/// or storage failure.
pub async fn list_pages(
    State(state): State<AppState>,
    query: Result<Query<ListPagesQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TrainingPagesList>>, HttpError> {
    let Query(query) = query?;
    let user_id = require_user(&query.user_id)?;
    let limit = normalized_limit(query.limit);
    let offset = query.offset.unwrap_or(0);

    let mut pages = state.db.pages.list_for_user(user_id)?;
    let criteria = list_criteria(&query);
    if !criteria.is_empty() {
        let zone = list_zone(&query)?;
        pages.retain(|page| {
            filter::matches(&TrainingPageRecord::from_remote(page, zone), &criteria)
        });
    }
    let matched = pages.len();
    let training_pages: Vec<_> = pages.into_iter().skip(offset).take(limit).collect();
    tracing::debug!(
        matched,
        offset,
        limit,
        returned = training_pages.len(),
        "listed training pages"
    );

    Ok(success(TrainingPagesList { training_pages }))
}

/// Fetch one page owned by the caller.
///
/// # Errors
/// Returns not found when the page is missing or owned by someone else.
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<TrainingPageWithTags>>, HttpError> {
    let Query(query) = query?;
    let user_id = require_user(&query.user_id)?;
    state
        .db
        .pages
        .get_owned(&id, user_id)?
        .map(success)
        .ok_or_else(|| AppError::NotFound.into())
}

/// Create a page and register its tags.
///
/// # Errors
/// Returns an error if validation or persistence fails.
pub async fn create_page(
    State(state): State<AppState>,
    payload: Result<Json<CreatePageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TrainingPageWithTags>>, HttpError> {
    let Json(mut req) = payload?;
    req.user_id = require_user(&req.user_id)?.to_string();
    validate_title(&req.title)?;

    let created = state.db.pages.create(&req)?;
    tracing::info!(page_id = %created.page.id, "created training page");
    Ok(success(created))
}

/// Replace a page's editable fields.
///
/// An empty body `id` takes the path id; any other mismatch is rejected.
///
/// # Errors
/// Returns an error if validation fails, the page is not the caller's, or
/// persistence fails.
pub async fn update_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TrainingPageWithTags>>, HttpError> {
    let Json(mut req) = payload?;
    if req.id.is_empty() {
        req.id = id.clone();
    } else if req.id != id {
        return Err(AppError::BadRequest("Page id does not match the URL".to_string()).into());
    }
    req.user_id = require_user(&req.user_id)?.to_string();
    validate_title(&req.title)?;

    let updated = state.db.pages.update(&req)?.ok_or(AppError::NotFound)?;
    tracing::info!(page_id = %id, "updated training page");
    Ok(success(updated))
}

/// Delete a page owned by the caller.
///
/// # Errors
/// Returns not found when the page is missing or owned by someone else.
pub async fn delete_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<bool>>, HttpError> {
    let Query(query) = query?;
    let user_id = require_user(&query.user_id)?;
    if state.db.pages.delete(&id, user_id)? {
        tracing::info!(page_id = %id, "deleted training page");
        Ok(success(true))
    } else {
        Err(AppError::NotFound.into())
    }
}
