//! Review API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/reviews/", get(handler::list).post(handler::create))
        .route(
            "/reviews/{id}/",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
}
