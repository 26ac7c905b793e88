//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Public routes: login and refresh
pub fn public_router() -> Router<ServerState> {
    Router::new()
        .route("/auth/login", post(handler::login))
        .route("/auth/refresh", post(handler::refresh))
}

/// Protected routes (behind `require_auth`)
pub fn router() -> Router<ServerState> {
    Router::new().route("/auth/me", get(handler::me))
}
