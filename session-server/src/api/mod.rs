//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (公共)
//! - [`auth`] - 员工登录、刷新令牌、当前用户
//! - [`guest`] - 访客扫码点餐接口 (访客令牌)
//! - [`sessions`] - 员工会话管理接口
//! - [`tables`] - 桌台管理接口
//! - [`menu`] - 菜单管理接口
//! - [`restaurants`] - 餐厅与设置接口

pub mod auth;
pub mod guest;
pub mod health;
pub mod menu;
pub mod restaurants;
pub mod sessions;
pub mod tables;

use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::utils::{AppError, AppResult};

/// `?restaurantId=` on staff list endpoints
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantQuery {
    pub restaurant_id: Option<i64>,
}

/// Restaurant a staff request targets: the explicit one, else the caller's own
pub(crate) fn resolve_restaurant(user: &CurrentUser, requested: Option<i64>) -> AppResult<i64> {
    requested
        .or(user.default_restaurant())
        .ok_or_else(|| AppError::validation("restaurantId is required"))
}
