//! Review API Handlers

use axum::http::StatusCode;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::Identity;
use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::db::repository::review::{ReviewFilter, ReviewOrdering};
use crate::utils::parse_id;
use shared::error::ErrorCode;
use shared::models::{RATING_MAX, RATING_MIN, Review, ReviewCreate, ReviewUpdate, Role};
use shared::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    business_user_id: Option<String>,
    reviewer_id: Option<String>,
    ordering: Option<String>,
}

fn review_not_found() -> AppError {
    AppError::new(ErrorCode::ReviewNotFound)
}

fn check_rating(rating: i64) -> Result<(), AppError> {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(AppError::new(ErrorCode::RatingOutOfRange));
    }
    Ok(())
}

fn parse_ordering(raw: Option<&str>) -> ReviewOrdering {
    match raw {
        Some("updated_at") => ReviewOrdering::UpdatedAt,
        Some("-updated_at") => ReviewOrdering::UpdatedAtDesc,
        Some("rating") => ReviewOrdering::Rating,
        Some("-rating") => ReviewOrdering::RatingDesc,
        _ => ReviewOrdering::default(),
    }
}

/// GET /reviews/ - list reviews with filters
pub async fn list(
    State(state): State<ServerState>,
    _identity: Identity,
    Query(query): Query<ReviewListQuery>,
) -> AppResult<Json<Vec<Review>>> {
    let business_user_id = query
        .business_user_id
        .map(|raw| {
            parse_id(&raw)
                .ok_or_else(|| AppError::field_validation("business_user_id", "Expected a numeric value"))
        })
        .transpose()?;
    let reviewer_id = query
        .reviewer_id
        .map(|raw| {
            parse_id(&raw)
                .ok_or_else(|| AppError::field_validation("reviewer_id", "Expected a numeric value"))
        })
        .transpose()?;

    let reviews = state
        .reviews()
        .list(&ReviewFilter {
            business_user_id,
            reviewer_id,
            ordering: parse_ordering(query.ordering.as_deref()),
        })
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(reviews))
}

/// POST /reviews/ - review a business account (customer only, one per pair)
pub async fn create(
    State(state): State<ServerState>,
    identity: Identity,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<(StatusCode, Json<Review>)> {
    if !identity.has_role(Role::Customer) {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            "Only customer accounts can write reviews",
        ));
    }
    check_rating(payload.rating)?;

    let target = state
        .users()
        .find_by_id(payload.business_user_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    if !target.is_some_and(|t| t.role == Role::Business) {
        return Err(AppError::new(ErrorCode::TargetNotBusiness));
    }

    let review = state
        .reviews()
        .create(identity.id, payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::AlreadyReviewed),
            RepoError::Validation(msg) => AppError::validation(msg),
            other => AppError::database(other.to_string()),
        })?;

    tracing::info!(
        review_id = review.id,
        reviewer = identity.id,
        business = review.business_user_id,
        "review created"
    );

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /reviews/{id}/ - single review
pub async fn get_by_id(
    State(state): State<ServerState>,
    _identity: Identity,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Review>> {
    let id = parse_id(&raw_id).ok_or_else(review_not_found)?;
    let review = state
        .reviews()
        .find_by_id(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(review_not_found)?;
    Ok(Json(review))
}

/// PATCH /reviews/{id}/ - edit rating or text (original reviewer only)
pub async fn update(
    State(state): State<ServerState>,
    identity: Identity,
    Path(raw_id): Path<String>,
    Json(payload): Json<ReviewUpdate>,
) -> AppResult<Json<Review>> {
    let id = parse_id(&raw_id).ok_or_else(review_not_found)?;
    let review = state
        .reviews()
        .find_by_id(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(review_not_found)?;

    if review.reviewer_id != identity.id {
        return Err(AppError::forbidden("You did not write this review"));
    }
    if let Some(rating) = payload.rating {
        check_rating(rating)?;
    }

    let review = state
        .reviews()
        .update(id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => review_not_found(),
            RepoError::Validation(msg) => AppError::validation(msg),
            other => AppError::database(other.to_string()),
        })?;
    Ok(Json(review))
}

/// DELETE /reviews/{id}/ - remove a review (original reviewer only)
pub async fn delete(
    State(state): State<ServerState>,
    identity: Identity,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&raw_id).ok_or_else(review_not_found)?;
    let review = state
        .reviews()
        .find_by_id(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(review_not_found)?;

    if review.reviewer_id != identity.id {
        return Err(AppError::forbidden("You did not write this review"));
    }

    state
        .reviews()
        .delete(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}
