//! Offer API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/offers/", get(handler::list).post(handler::create))
        .route(
            "/offers/{id}/",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
        .route("/offerdetails/{id}/", get(handler::get_detail))
}
