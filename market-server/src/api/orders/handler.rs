//! Order API Handlers

use axum::http::StatusCode;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::auth::Identity;
use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::utils::parse_id;
use shared::error::ErrorCode;
use shared::models::{Order, OrderCreate, OrderStatusUpdate, Role};
use shared::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct OrderCount {
    pub order_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CompletedOrderCount {
    pub completed_order_count: i64,
}

fn order_not_found() -> AppError {
    AppError::new(ErrorCode::OrderNotFound)
}

/// GET /orders/ - orders the caller participates in, newest first
pub async fn list(
    State(state): State<ServerState>,
    identity: Identity,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state
        .orders()
        .list_for_user(identity.id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(orders))
}

/// POST /orders/ - place an order for one tier (customer only)
pub async fn create(
    State(state): State<ServerState>,
    identity: Identity,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    if !identity.has_role(Role::Customer) {
        return Err(AppError::with_message(
            ErrorCode::RoleRequired,
            "Only customer accounts can place orders",
        ));
    }

    let order = state
        .orders()
        .create_from_detail(identity.id, payload.offer_detail_id)
        .await
        .map_err(|e| match e {
            // an unknown tier id is a bad request, not a missing resource
            RepoError::NotFound(_) => AppError::new(ErrorCode::OfferDetailInvalid),
            other => AppError::database(other.to_string()),
        })?;

    tracing::info!(
        order_id = order.id,
        customer = identity.id,
        business = order.business_user_id,
        "order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/{id}/ - single order, visible to either party
pub async fn get_by_id(
    State(state): State<ServerState>,
    identity: Identity,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Order>> {
    let id = parse_id(&raw_id).ok_or_else(order_not_found)?;
    let order = state
        .orders()
        .find_by_id(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(order_not_found)?;

    if order.customer_user_id != identity.id && order.business_user_id != identity.id {
        return Err(AppError::forbidden("You are not a party to this order"));
    }

    Ok(Json(order))
}

/// PATCH /orders/{id}/ - move the order status (business party only)
pub async fn update_status(
    State(state): State<ServerState>,
    identity: Identity,
    Path(raw_id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let id = parse_id(&raw_id).ok_or_else(order_not_found)?;
    let order = state
        .orders()
        .find_by_id(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(order_not_found)?;

    if order.business_user_id != identity.id {
        return Err(AppError::forbidden(
            "Only the business party can update the order status",
        ));
    }

    let order = state
        .orders()
        .update_status(id, payload.status)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => order_not_found(),
            RepoError::Validation(_) => AppError::new(ErrorCode::OrderAlreadyFinal),
            other => AppError::database(other.to_string()),
        })?;
    Ok(Json(order))
}

/// DELETE /orders/{id}/ - remove an order (staff only)
pub async fn delete(
    State(state): State<ServerState>,
    identity: Identity,
    Path(raw_id): Path<String>,
) -> AppResult<StatusCode> {
    if !identity.is_staff() {
        return Err(AppError::with_message(
            ErrorCode::AdminRequired,
            "Only staff can delete orders",
        ));
    }

    let id = parse_id(&raw_id).ok_or_else(order_not_found)?;
    let deleted = state
        .orders()
        .delete(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    if !deleted {
        return Err(order_not_found());
    }

    tracing::info!(order_id = id, staff = identity.id, "order deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /order-count/{business_user_id}/ - open orders of one business (public)
pub async fn order_count(
    State(state): State<ServerState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<OrderCount>> {
    let business_id = resolve_business(&state, &raw_id).await?;
    let order_count = state
        .orders()
        .count_in_progress(business_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(OrderCount { order_count }))
}

/// GET /completed-order-count/{business_user_id}/ - completed orders (public)
pub async fn completed_order_count(
    State(state): State<ServerState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<CompletedOrderCount>> {
    let business_id = resolve_business(&state, &raw_id).await?;
    let completed_order_count = state
        .orders()
        .count_completed(business_id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(CompletedOrderCount {
        completed_order_count,
    }))
}

/// Count endpoints 404 unless the id resolves to a business account
async fn resolve_business(state: &ServerState, raw_id: &str) -> Result<i64, AppError> {
    let not_found = || AppError::new(ErrorCode::AccountNotFound);
    let id = parse_id(raw_id).ok_or_else(not_found)?;
    let user = state
        .users()
        .find_by_id(id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(not_found)?;
    if user.role != Role::Business {
        return Err(not_found());
    }
    Ok(user.id)
}
