//! Guest API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::GuestSession;
use crate::core::ServerState;
use crate::sessions::JoinTarget;
use crate::utils::validation::validate_request;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::dto::{
    AddCartItemRequest, BillSplit, GuestMenuResponse, GuestTableResponse, JoinSessionRequest,
    JoinSessionResponse, SessionDetails, SessionSummary, SetTipRequest, SubmitOrderRequest,
    UpdateCartItemRequest,
};
use shared::models::{CartItem, Order};

/// POST /guest/sessions/join - 扫码入座或凭会话码加入
///
/// 201 when a new session was opened, 200 when joining a live one.
pub async fn join(
    State(state): State<ServerState>,
    Json(req): Json<JoinSessionRequest>,
) -> AppResult<(StatusCode, Json<JoinSessionResponse>)> {
    validate_request(&req)?;

    let outcome = match (req.table_qr_code.as_deref(), req.session_code.as_deref()) {
        (Some(qr), None) => state.sessions.create_or_join(
            JoinTarget::QrCode(qr),
            &req.guest_name,
            req.guest_phone.as_deref(),
            req.special_requests.as_deref(),
            req.restaurant_id,
        )?,
        (None, Some(code)) => {
            state
                .sessions
                .join_by_code(code, &req.guest_name, req.guest_phone.as_deref())?
        }
        _ => {
            return Err(AppError::validation(
                "Exactly one of tableQrCode or sessionCode is required",
            ));
        }
    };

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into_response())))
}

/// GET /guest/sessions/{id}
pub async fn get_session(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
) -> AppResult<Json<SessionDetails>> {
    let view = state.sessions.guest_view(&session_id, &guest.token)?;
    Ok(Json(view))
}

/// POST /guest/sessions/{id}/cart
pub async fn add_to_cart(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
    Json(req): Json<AddCartItemRequest>,
) -> AppResult<(StatusCode, Json<CartItem>)> {
    validate_request(&req)?;
    let item = state.sessions.add_to_cart(&session_id, &guest.token, &req)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /guest/sessions/{id}/cart/{cartItemId}
pub async fn update_cart_item(
    State(state): State<ServerState>,
    Path((session_id, cart_item_id)): Path<(String, String)>,
    guest: GuestSession,
    Json(req): Json<UpdateCartItemRequest>,
) -> AppResult<Json<CartItem>> {
    validate_request(&req)?;
    let item = state
        .sessions
        .update_cart_item(&session_id, &guest.token, &cart_item_id, &req)?;
    Ok(Json(item))
}

/// DELETE /guest/sessions/{id}/cart/{cartItemId}
pub async fn remove_cart_item(
    State(state): State<ServerState>,
    Path((session_id, cart_item_id)): Path<(String, String)>,
    guest: GuestSession,
) -> AppResult<Json<bool>> {
    state
        .sessions
        .remove_cart_item(&session_id, &guest.token, &cart_item_id)?;
    Ok(Json(true))
}

/// POST /guest/sessions/{id}/orders
///
/// The body is optional; an empty body submits the caller's own items.
pub async fn submit_order(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Order>)> {
    let req: SubmitOrderRequest = if body.is_empty() {
        SubmitOrderRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::with_message(ErrorCode::InvalidFormat, e.to_string()))?
    };

    let order = state
        .sessions
        .submit_order(&session_id, &guest.token, req.scope)?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /guest/sessions/{id}/orders
pub async fn list_orders(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.sessions.list_orders(&session_id, &guest.token)?))
}

/// POST /guest/sessions/{id}/leave
pub async fn leave(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
) -> AppResult<Json<SessionSummary>> {
    let session = state.sessions.leave(&session_id, &guest.token)?;
    Ok(Json(SessionSummary::from(&session)))
}

/// POST /guest/sessions/{id}/call-waiter
pub async fn call_waiter(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
) -> AppResult<Json<SessionSummary>> {
    let session = state.sessions.call_waiter(&session_id, &guest.token)?;
    Ok(Json(SessionSummary::from(&session)))
}

/// POST /guest/sessions/{id}/request-bill
pub async fn request_bill(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
) -> AppResult<Json<SessionSummary>> {
    let session = state.sessions.request_bill(&session_id, &guest.token)?;
    Ok(Json(SessionSummary::from(&session)))
}

/// PUT /guest/sessions/{id}/tip
pub async fn set_tip(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
    Json(req): Json<SetTipRequest>,
) -> AppResult<Json<SessionSummary>> {
    let session = state
        .sessions
        .set_tip(&session_id, &guest.token, req.amount)?;
    Ok(Json(SessionSummary::from(&session)))
}

/// GET /guest/sessions/{id}/bill
pub async fn bill_split(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
) -> AppResult<Json<BillSplit>> {
    Ok(Json(state.sessions.bill_split(&session_id, &guest.token)?))
}

/// GET /guest/tables/{qrCode}
pub async fn table(
    State(state): State<ServerState>,
    Path(qr_code): Path<String>,
) -> AppResult<Json<GuestTableResponse>> {
    Ok(Json(state.sessions.table_view(&qr_code)?))
}

/// GET /guest/restaurants/{id}/menu
pub async fn menu(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<GuestMenuResponse>> {
    Ok(Json(state.sessions.guest_menu(restaurant_id)?))
}
