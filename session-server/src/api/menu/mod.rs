//! Menu API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/menu", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/items", get(handler::list))
        .route("/categories", get(handler::list_categories))
        .route_layer(middleware::from_fn(require_permission("sessions:read")));

    let manage_routes = Router::new()
        .route("/items", post(handler::create))
        .route("/items/{id}", put(handler::update))
        .route("/categories", post(handler::create_category))
        .route(
            "/categories/{id}",
            put(handler::update_category).delete(handler::delete_category),
        )
        .route_layer(middleware::from_fn(require_permission("menu:manage")));

    read_routes.merge(manage_routes)
}
