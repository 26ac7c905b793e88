//! Restaurant API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let create_routes = Router::new()
        .route("/restaurants", post(handler::create))
        .route_layer(middleware::from_fn(require_permission("all")));

    let settings_routes = Router::new()
        .route(
            "/restaurants/{id}/settings",
            get(handler::get_settings).put(handler::update_settings),
        )
        .route_layer(middleware::from_fn(require_permission("settings:manage")));

    create_routes.merge(settings_routes)
}
