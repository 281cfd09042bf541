//! Order API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/orders/", get(handler::list).post(handler::create))
        .route(
            "/orders/{id}/",
            get(handler::get_by_id)
                .patch(handler::update_status)
                .delete(handler::delete),
        )
        .route(
            "/orders/order-count/{business_user_id}/",
            get(handler::order_count),
        )
        .route(
            "/orders/completed-order-count/{business_user_id}/",
            get(handler::completed_order_count),
        )
}
