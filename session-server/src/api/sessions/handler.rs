//! Staff Session API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::dto::{
    Page, PageQuery, SessionDetails, SessionHistoryEntry, SessionSummary,
    UpdateOrderStatusRequest,
};
use shared::models::Order;

/// GET /sessions/restaurant/{id}/active - 活动会话
pub async fn active(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<Vec<SessionDetails>>> {
    let sessions = state.sessions.active_sessions(user.scope(), restaurant_id)?;
    Ok(Json(sessions))
}

/// GET /sessions/restaurant/{id}/history?page&size - 会话历史 (分页)
pub async fn history(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<SessionHistoryEntry>>> {
    let page = state
        .sessions
        .session_history(user.scope(), restaurant_id, query)?;
    Ok(Json(page))
}

/// GET /sessions/{id}/details
pub async fn details(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionDetails>> {
    Ok(Json(state.sessions.session_details(user.scope(), &session_id)?))
}

/// POST /sessions/{id}/end - 结账完成，释放桌台
pub async fn end(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionSummary>> {
    let session = state.sessions.end_session(user.scope(), &session_id)?;
    tracing::info!(session_id = %session_id, user = %user.username, "Session ended by staff");
    Ok(Json(SessionSummary::from(&session)))
}

/// POST /sessions/{id}/pause
pub async fn pause(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionSummary>> {
    let session = state.sessions.pause_session(user.scope(), &session_id)?;
    Ok(Json(SessionSummary::from(&session)))
}

/// POST /sessions/{id}/resume
pub async fn resume(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionSummary>> {
    let session = state.sessions.resume_session(user.scope(), &session_id)?;
    Ok(Json(SessionSummary::from(&session)))
}

/// POST /sessions/{id}/cancel - 作废会话，释放桌台
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionSummary>> {
    let session = state.sessions.cancel_session(user.scope(), &session_id)?;
    tracing::info!(session_id = %session_id, user = %user.username, "Session cancelled by staff");
    Ok(Json(SessionSummary::from(&session)))
}

/// POST /sessions/{id}/waiter/acknowledge
pub async fn acknowledge_waiter(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionSummary>> {
    let session = state
        .sessions
        .acknowledge_waiter(user.scope(), &session_id)?;
    Ok(Json(SessionSummary::from(&session)))
}

/// PUT /sessions/{id}/orders/{orderId}/status
pub async fn update_order_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((session_id, order_id)): Path<(String, String)>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .sessions
        .advance_order_status(user.scope(), &session_id, &order_id, req.status)?;
    Ok(Json(order))
}
