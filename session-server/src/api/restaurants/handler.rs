//! Restaurant API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::validate_request;
use shared::models::{Restaurant, RestaurantCreate, RestaurantSettingsUpdate};

/// POST /restaurants - 创建餐厅及其经理账号
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<RestaurantCreate>,
) -> AppResult<(StatusCode, Json<Restaurant>)> {
    validate_request(&payload)?;
    let hash = hash_password(&payload.manager_password)?;
    let (restaurant, _manager) = state.sessions.create_restaurant(&payload, &hash)?;
    tracing::debug!(restaurant_id = restaurant.id, created_by = %user.username, "Restaurant provisioned");
    Ok((StatusCode::CREATED, Json(restaurant)))
}

/// GET /restaurants/{id}/settings
pub async fn get_settings(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(state.sessions.get_restaurant(user.scope(), id)?))
}

/// PUT /restaurants/{id}/settings - 税率、服务费、币种
///
/// 只影响之后新开的会话，已开会话保留开台时的费率。
pub async fn update_settings(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantSettingsUpdate>,
) -> AppResult<Json<Restaurant>> {
    validate_request(&payload)?;
    Ok(Json(state.sessions.update_settings(user.scope(), id, &payload)?))
}
