//! Offer API Handlers

use axum::http::StatusCode;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::auth::Identity;
use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::db::repository::offer::{OfferFilter, OfferOrdering};
use crate::utils::parse_id;
use shared::error::ErrorCode;
use shared::models::{
    OfferCreate, OfferDetail, OfferItem, OfferType, OfferUpdate, Paginated, Role,
};
use shared::{AppError, AppResult};
use std::collections::BTreeSet;

const DEFAULT_PAGE_SIZE: i64 = 6;
const MAX_PAGE_SIZE: i64 = 100;

/// Raw query string; every numeric field is validated by hand so malformed
/// values produce a field-keyed 400 instead of a generic rejection
#[derive(Debug, Default, Deserialize)]
pub struct OfferListQuery {
    creator_id: Option<String>,
    /// Alias for `creator_id` used by the web client
    user: Option<String>,
    min_price: Option<String>,
    max_delivery_time: Option<String>,
    search: Option<String>,
    ordering: Option<String>,
    page: Option<String>,
    page_size: Option<String>,
}

impl OfferListQuery {
    fn into_filter(self) -> Result<OfferFilter, AppError> {
        let creator_raw = match (self.creator_id, self.user) {
            (Some(a), Some(b)) if a != b => {
                return Err(AppError::field_validation(
                    "creator_id",
                    "Conflicts with the user parameter",
                ));
            }
            (a, b) => a.or(b),
        };
        let creator_id = creator_raw
            .map(|raw| parse_int(&raw, "creator_id"))
            .transpose()?;
        let min_price = self.min_price.map(|raw| parse_price(&raw)).transpose()?;
        let max_delivery_time = self
            .max_delivery_time
            .map(|raw| parse_int(&raw, "max_delivery_time"))
            .transpose()?;
        let page = self
            .page
            .map(|raw| parse_int(&raw, "page"))
            .transpose()?
            .unwrap_or(1);
        let page_size = self
            .page_size
            .map(|raw| parse_int(&raw, "page_size"))
            .transpose()?
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        Ok(OfferFilter {
            creator_id,
            min_price,
            max_delivery_time,
            search: self.search.filter(|s| !s.is_empty()),
            ordering: parse_ordering(self.ordering.as_deref()),
            page: page.max(1),
            page_size,
        })
    }
}

fn parse_int(raw: &str, field: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::field_validation(field, "Expected a numeric value"))
}

/// Prices travel as cents; a decimal form like "1000.0" is accepted
fn parse_price(raw: &str) -> Result<i64, AppError> {
    raw.parse::<Decimal>()
        .ok()
        .and_then(|d| d.round().to_i64())
        .ok_or_else(|| AppError::field_validation("min_price", "Expected a numeric value"))
}

/// Unknown ordering values fall back to the default, like any other
/// unsupported query parameter
fn parse_ordering(raw: Option<&str>) -> OfferOrdering {
    match raw {
        Some("updated_at") => OfferOrdering::UpdatedAt,
        Some("-updated_at") => OfferOrdering::UpdatedAtDesc,
        Some("min_price") => OfferOrdering::MinPrice,
        Some("-min_price") => OfferOrdering::MinPriceDesc,
        _ => OfferOrdering::default(),
    }
}

fn offer_not_found() -> AppError {
    AppError::new(ErrorCode::OfferNotFound)
}

/// Creation-time tier invariants; the repository re-checks them inside the
/// transaction
fn check_tiers(payload: &OfferCreate) -> Result<(), AppError> {
    if payload.details.len() != 3 {
        return Err(AppError::new(ErrorCode::TierCountInvalid));
    }
    let types: BTreeSet<OfferType> = payload.details.iter().map(|d| d.offer_type).collect();
    if types != BTreeSet::from(OfferType::ALL) {
        return Err(AppError::new(ErrorCode::TierSetInvalid));
    }
    if payload.details.iter().any(|d| d.features.is_empty()) {
        return Err(AppError::new(ErrorCode::FeaturesEmpty));
    }
    Ok(())
}

/// GET /offers/ - public catalog listing with filters and pagination
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OfferListQuery>,
) -> AppResult<Json<Paginated<OfferItem>>> {
    let filter = query.into_filter()?;
    let page = state
        .offers()
        .list(&filter)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(page))
}

/// POST /offers/ - create an offer with its three tiers (business only)
pub async fn create(
    State(state): State<ServerState>,
    identity: Identity,
    Json(payload): Json<OfferCreate>,
) -> AppResult<(StatusCode, Json<OfferItem>)> {
    if !identity.has_role(Role::Business) {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            "Only business accounts can create offers",
        ));
    }
    check_tiers(&payload)?;

    let item = state
        .offers()
        .create(identity.id, payload)
        .await
        .map_err(|e| match e {
            RepoError::Validation(msg) => AppError::validation(msg),
            other => AppError::database(other.to_string()),
        })?;

    tracing::info!(offer_id = item.id, user_id = identity.id, "offer created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /offers/{id}/ - single offer with aggregates
pub async fn get_by_id(
    State(state): State<ServerState>,
    _identity: Identity,
    Path(raw_id): Path<String>,
) -> AppResult<Json<OfferItem>> {
    let id = parse_id(&raw_id).ok_or_else(offer_not_found)?;
    let item = state
        .offers()
        .find_item(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(offer_not_found)?;
    Ok(Json(item))
}

/// PATCH /offers/{id}/ - partial update (owner or staff)
pub async fn update(
    State(state): State<ServerState>,
    identity: Identity,
    Path(raw_id): Path<String>,
    Json(payload): Json<OfferUpdate>,
) -> AppResult<Json<OfferItem>> {
    let id = parse_id(&raw_id).ok_or_else(offer_not_found)?;
    let offer = state
        .offers()
        .find_by_id(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(offer_not_found)?;

    if offer.user_id != identity.id && !identity.is_staff() {
        return Err(AppError::forbidden("You do not own this offer"));
    }

    let item = state
        .offers()
        .update(id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => offer_not_found(),
            RepoError::Validation(msg) => AppError::validation(msg),
            other => AppError::database(other.to_string()),
        })?;
    Ok(Json(item))
}

/// DELETE /offers/{id}/ - delete an offer and its tiers (owner or staff)
pub async fn delete(
    State(state): State<ServerState>,
    identity: Identity,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&raw_id).ok_or_else(offer_not_found)?;
    let offer = state
        .offers()
        .find_by_id(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(offer_not_found)?;

    if offer.user_id != identity.id && !identity.is_staff() {
        return Err(AppError::forbidden("You do not own this offer"));
    }

    state
        .offers()
        .delete(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(offer_id = id, user_id = identity.id, "offer deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /offerdetails/{id}/ - one tier with all fields
pub async fn get_detail(
    State(state): State<ServerState>,
    _identity: Identity,
    Path(raw_id): Path<String>,
) -> AppResult<Json<OfferDetail>> {
    let id = parse_id(&raw_id).ok_or_else(|| AppError::new(ErrorCode::OfferDetailNotFound))?;
    let detail = state
        .offers()
        .find_detail(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::new(ErrorCode::OfferDetailNotFound))?;
    Ok(Json(detail))
}
