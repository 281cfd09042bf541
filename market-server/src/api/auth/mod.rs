//! Auth API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/auth/registration/", post(handler::registration))
        .route("/auth/login/", post(handler::login))
}
