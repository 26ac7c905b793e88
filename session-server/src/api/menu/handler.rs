//! Menu API Handlers

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
use shared::models::{
    MenuCategory, MenuCategoryCreate, MenuCategoryUpdate, MenuItem, MenuItemCreate,
    MenuItemUpdate,
};

/// GET /menu/items?restaurantId= - 全部菜品 (含下架)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<RestaurantQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let restaurant_id = resolve_restaurant(&user, query.restaurant_id)?;
    Ok(Json(state.sessions.list_menu_items(user.scope(), restaurant_id)?))
}

/// POST /menu/items
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    validate_request(&payload)?;
    let restaurant_id = resolve_restaurant(&user, payload.restaurant_id)?;
    let item = state
        .sessions
        .create_menu_item(user.scope(), restaurant_id, &payload)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /menu/items/{id}
///
/// 价格变更只影响之后加入购物车的条目。
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    validate_request(&payload)?;
    Ok(Json(state.sessions.update_menu_item(user.scope(), id, &payload)?))
}

/// GET /menu/categories?restaurantId=
pub async fn list_categories(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<RestaurantQuery>,
) -> AppResult<Json<Vec<MenuCategory>>> {
    let restaurant_id = resolve_restaurant(&user, query.restaurant_id)?;
    Ok(Json(state.sessions.list_categories(user.scope(), restaurant_id)?))
}

/// POST /menu/categories
pub async fn create_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<MenuCategoryCreate>,
) -> AppResult<(StatusCode, Json<MenuCategory>)> {
    validate_request(&payload)?;
    let restaurant_id = resolve_restaurant(&user, payload.restaurant_id)?;
    let category = state
        .sessions
        .create_category(user.scope(), restaurant_id, &payload)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /menu/categories/{id}
pub async fn update_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<MenuCategoryUpdate>,
) -> AppResult<Json<MenuCategory>> {
    validate_request(&payload)?;
    Ok(Json(state.sessions.update_category(user.scope(), id, &payload)?))
}

/// DELETE /menu/categories/{id} - 仅限空分类
pub async fn delete_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.sessions.delete_category(user.scope(), id)?;
    Ok(Json(true))
}
