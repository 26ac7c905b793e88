//! Staff Session API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/sessions", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/restaurant/{restaurant_id}/active", get(handler::active))
        .route("/restaurant/{restaurant_id}/history", get(handler::history))
        .route("/{session_id}/details", get(handler::details))
        .route_layer(middleware::from_fn(require_permission("sessions:read")));

    let manage_routes = Router::new()
        .route("/{session_id}/end", post(handler::end))
        .route("/{session_id}/pause", post(handler::pause))
        .route("/{session_id}/resume", post(handler::resume))
        .route("/{session_id}/cancel", post(handler::cancel))
        .route(
            "/{session_id}/waiter/acknowledge",
            post(handler::acknowledge_waiter),
        )
        .route_layer(middleware::from_fn(require_permission("sessions:manage")));

    let order_routes = Router::new()
        .route(
            "/{session_id}/orders/{order_id}/status",
            put(handler::update_order_status),
        )
        .route_layer(middleware::from_fn(require_permission("orders:manage")));

    read_routes.merge(manage_routes).merge(order_routes)
}
