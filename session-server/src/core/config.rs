use std::path::PathBuf;
use std::time::Duration;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// 服务器配置 - 会话服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 关闭超时(毫秒) |
/// | SESSION_IDLE_TIMEOUT_MINUTES | 180 | 会话空闲超时(分钟) |
/// | SWEEP_INTERVAL_SECS | 60 | 清扫周期(秒) |
/// | MAX_GUESTS_PER_SESSION | 20 | 每个会话的访客上限 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | BOOTSTRAP_ADMIN_USERNAME | - | 首次启动创建的平台管理员 |
/// | BOOTSTRAP_ADMIN_PASSWORD | - | 平台管理员密码 |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/dining HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,

    // === 会话配置 ===
    /// 无订单会话的空闲超时 (分钟)
    pub session_idle_timeout_minutes: u64,
    /// 清扫周期 (秒)
    pub sweep_interval_secs: u64,
    /// 每个会话的访客上限
    pub max_guests_per_session: usize,

    // === 日志 ===
    pub log_level: String,
    pub log_json: bool,

    // === 初始管理员 ===
    pub bootstrap_admin_username: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值。JWT 密钥不合法时返回错误。
    pub fn from_env() -> Result<Self, ServerError> {
        let jwt = JwtConfig::from_env().map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 8080),
            jwt,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10000),
            session_idle_timeout_minutes: env_or("SESSION_IDLE_TIMEOUT_MINUTES", 180),
            sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", 60),
            max_guests_per_session: env_or("MAX_GUESTS_PER_SESSION", 20),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            bootstrap_admin_username: env_opt("BOOTSTRAP_ADMIN_USERNAME"),
            bootstrap_admin_password: env_opt("BOOTSTRAP_ADMIN_PASSWORD"),
        })
    }

    /// 使用自定义工作目录和端口覆盖配置
    ///
    /// 常用于测试场景，JWT 使用随机密钥
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port,
            jwt: JwtConfig::with_random_secret(),
            environment: "development".into(),
            request_timeout_ms: 30000,
            shutdown_timeout_ms: 10000,
            session_idle_timeout_minutes: 180,
            sweep_interval_secs: 60,
            max_guests_per_session: 20,
            log_level: "info".into(),
            log_json: false,
            bootstrap_admin_username: None,
            bootstrap_admin_password: None,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 数据库文件: work_dir/database/sessions.redb
    pub fn database_path(&self) -> PathBuf {
        self.database_dir().join("sessions.redb")
    }

    /// 日志目录: work_dir/logs
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_minutes * 60)
    }
}
