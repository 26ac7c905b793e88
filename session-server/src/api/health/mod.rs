//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 状态、版本、运行时长、存储往返检查 | 无 |

use axum::{Json, Router, extract::State, routing::get};
use shared::client::HealthResponse;

use crate::core::ServerState;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 基础健康检查
///
/// 存储不可用时 status 为 `degraded`，HTTP 状态仍为 200。
pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let storage_ok = match state.sessions.storage().ping() {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(error = %e, "Storage health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if storage_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        storage_ok,
    })
}
