//! Guest QR-ordering API
//!
//! Join, table lookup and menu are public; every other route needs the
//! guest token returned by join (`X-Guest-Token` header or `?guestToken=`).

mod events;
mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/guest", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/sessions/join", post(handler::join))
        .route("/sessions/{session_id}", get(handler::get_session))
        .route("/sessions/{session_id}/cart", post(handler::add_to_cart))
        .route(
            "/sessions/{session_id}/cart/{cart_item_id}",
            put(handler::update_cart_item).delete(handler::remove_cart_item),
        )
        .route(
            "/sessions/{session_id}/orders",
            post(handler::submit_order).get(handler::list_orders),
        )
        .route("/sessions/{session_id}/leave", post(handler::leave))
        .route("/sessions/{session_id}/call-waiter", post(handler::call_waiter))
        .route("/sessions/{session_id}/request-bill", post(handler::request_bill))
        .route("/sessions/{session_id}/tip", put(handler::set_tip))
        .route("/sessions/{session_id}/bill", get(handler::bill_split))
        .route("/sessions/{session_id}/events", get(events::stream))
        .route("/tables/{qr_code}", get(handler::table))
        .route("/restaurants/{restaurant_id}/menu", get(handler::menu))
}
