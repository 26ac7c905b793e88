//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::{RestaurantQuery, resolve_restaurant};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::validate_request;
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};

/// GET /tables?restaurantId= - 获取餐厅的所有桌台
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<RestaurantQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let restaurant_id = resolve_restaurant(&user, query.restaurant_id)?;
    Ok(Json(state.sessions.list_tables(user.scope(), restaurant_id)?))
}

/// GET /tables/{id} - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.sessions.get_table(user.scope(), id)?))
}

/// POST /tables - 创建桌台 (自动生成二维码)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<DiningTable>)> {
    validate_request(&payload)?;
    let restaurant_id = resolve_restaurant(&user, payload.restaurant_id)?;
    let table = state
        .sessions
        .create_table(user.scope(), restaurant_id, &payload)?;
    tracing::info!(table_id = table.id, table_number = %table.table_number, "Table created");
    Ok((StatusCode::CREATED, Json(table)))
}

/// PUT /tables/{id} - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    validate_request(&payload)?;
    Ok(Json(state.sessions.update_table(user.scope(), id, &payload)?))
}

/// POST /tables/{id}/qr-code - 重新生成二维码，旧码立即失效
pub async fn regenerate_qr_code(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.sessions.regenerate_qr_code(user.scope(), id)?))
}
