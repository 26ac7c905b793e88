use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue, StatusCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use std::time::Duration;
use uuid::Uuid;

use crate::api;
use crate::auth::require_auth;
use crate::core::ServerState;
use crate::middleware;

const REQUEST_ID_HEADER: &str = "x-request-id";

fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Routes open to anyone: guest surface, login/refresh, health
pub fn public_router() -> Router<ServerState> {
    Router::new()
        .merge(api::guest::router())
        .merge(api::auth::public_router())
        .merge(api::health::router())
}

/// Staff routes, each group carrying its own `require_permission`
pub fn staff_router() -> Router<ServerState> {
    Router::new()
        .merge(api::auth::router())
        .merge(api::sessions::router())
        .merge(api::tables::router())
        .merge(api::menu::router())
        .merge(api::restaurants::router())
}

/// Build a fully configured application with all middleware
///
/// Used by the HTTP server and by in-process (oneshot) callers.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    // route_layer: unmatched paths still fall through to 404
    let staff = staff_router()
        .route_layer(axum_middleware::from_fn(middleware::expose_user))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    public_router()
        .merge(staff)
        // ========== Application Middleware ==========
        // Per-request deadline, answered with 408
        .layer(timeout_layer(state.config.request_timeout()))
        // Uniform error envelope, also for framework rejections and timeouts
        .layer(axum_middleware::from_fn(middleware::error_envelope))
        // ========== Tower HTTP Middleware ==========
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        // Request logging - sees the request id set below
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
}
