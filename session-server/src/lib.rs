//! Dining Session Server - 多人扫码同桌点餐后端
//!
//! # 架构概述
//!
//! - **会话核心** (`sessions`): 桌台、访客、共享购物车、订单与会话生命周期
//! - **存储** (`sessions::storage`): 嵌入式 redb，单写事务串行化
//! - **认证** (`auth`): 员工 JWT + Argon2，访客不透明令牌
//! - **HTTP API** (`api`): 访客接口、员工接口、SSE 事件流
//!
//! # 模块结构
//!
//! ```text
//! session-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT、密码、权限、提取器
//! ├── sessions/      # 会话核心与存储
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 应用组装与中间件栈
//! ├── middleware/    # 请求日志、错误信封
//! └── utils/         # 校验、日志初始化
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod middleware;
pub mod routes;
pub mod sessions;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use routes::build_app;
pub use sessions::SessionManager;
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境：加载 .env、读取配置、初始化日志
///
/// 日志写入 `WORK_DIR/logs`，目录不存在时会先创建。
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    init_logger_with_file(Some(&config.log_level), Some(config.log_json), log_dir.to_str());

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ____  _       _
  |  _ \(_)_ __ (_)_ __   __ _
  | | | | | '_ \| | '_ \ / _` |
  | |_| | | | | | | | | | (_| |
  |____/|_|_| |_|_|_| |_|\__, |
   ___                   |___/
  / __| ___ _____(_)___ _ _  ___
  \__ \/ -_|_-<_-< / _ \ ' \(_-<
  |___/\___/__/__/_\___/_||_/__/
    "#
    );
}
