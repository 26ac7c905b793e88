use std::sync::Arc;
use std::time::Instant;

use crate::auth::{JwtService, hash_password};
use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result};
use crate::sessions::{SessionManager, SessionSweeper};

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，可作为 axum `State` 在处理器之间共享。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | sessions | Arc<SessionManager> | 会话核心 (redb) |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | started_at | Instant | 启动时间 (健康检查) |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 会话核心
    pub sessions: Arc<SessionManager>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 启动时间
    pub started_at: Instant,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 会话存储 (work_dir/database/sessions.redb)
    /// 3. JWT 服务
    /// 4. 初始平台管理员 (仅当尚无员工账号)
    pub fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_path();
        tracing::info!(path = %db_path.display(), "Opening session storage");
        let sessions = SessionManager::new(&db_path, config.max_guests_per_session)?;

        let state = Self {
            config: config.clone(),
            sessions: Arc::new(sessions),
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            started_at: Instant::now(),
        };

        state.bootstrap_admin()?;
        Ok(state)
    }

    fn bootstrap_admin(&self) -> Result<()> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin_username.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        let hash = hash_password(password)
            .map_err(|e| crate::core::ServerError::Config(e.message))?;
        if self.sessions.bootstrap_admin(username, &hash)? {
            tracing::info!(username = %username, "Bootstrap admin account created");
        } else {
            tracing::debug!("Staff accounts exist, bootstrap admin skipped");
        }
        Ok(())
    }

    /// 启动后台任务
    ///
    /// 启动的任务：
    /// - 会话清扫器 (SessionSweeper)
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let sweeper = SessionSweeper::new(
            self.sessions.clone(),
            self.config.sweep_interval(),
            self.config.session_idle_timeout(),
            tasks.shutdown_token(),
        );
        tasks.spawn("session_sweeper", sweeper.run());
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// 运行时长 (秒)
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
