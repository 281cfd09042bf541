//! API Route Module
//!
//! # Structure
//!
//! - [`auth`] - registration and login
//! - [`offers`] - offer catalog and tier lookup
//! - [`orders`] - order placement, status transitions and counts
//! - [`reviews`] - review ledger
//! - [`base_info`] - public platform statistics

pub mod auth;
pub mod base_info;
pub mod offers;
pub mod orders;
pub mod reviews;

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::core::ServerState;

/// HTTP request log middleware
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Assemble the full application router
pub fn build_app(state: ServerState) -> Router {
    Router::<ServerState>::new()
        .merge(auth::router())
        .merge(offers::router())
        .merge(orders::router())
        .merge(reviews::router())
        .merge(base_info::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}
