//! 会话清扫器
//!
//! 周期性取消长时间无活动且没有订单的会话，修复指向不存在或已结束会话的
//! 桌台指针，并清理已结束会话的访客令牌。

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::manager::{SessionManager, SweepReport};
use shared::util::now_millis;

/// 会话清扫器
///
/// 在 `start_background_tasks()` 中注册并启动。
pub struct SessionSweeper {
    manager: Arc<SessionManager>,
    interval: Duration,
    idle_timeout: Duration,
    shutdown: CancellationToken,
}

impl SessionSweeper {
    pub fn new(
        manager: Arc<SessionManager>,
        interval: Duration,
        idle_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            manager,
            interval,
            idle_timeout,
            shutdown,
        }
    }

    /// 主循环：每个周期执行一次清扫，收到 shutdown 信号后退出
    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            idle_timeout_mins = self.idle_timeout.as_secs() / 60,
            "Session sweeper started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }

        tracing::info!("Session sweeper stopped");
    }

    /// 执行一次清扫 (redb 同步操作，放到 blocking 线程)
    pub async fn sweep_once(&self) -> Option<SweepReport> {
        let manager = self.manager.clone();
        let idle_ms = i64::try_from(self.idle_timeout.as_millis()).unwrap_or(i64::MAX);

        let result = tokio::task::spawn_blocking(move || manager.sweep(now_millis(), idle_ms)).await;
        match result {
            Ok(Ok(report)) => {
                if !report.is_empty() {
                    tracing::info!(
                        cancelled = report.cancelled.len(),
                        reconciled_tables = report.reconciled_tables.len(),
                        purged_tokens = report.purged_tokens,
                        "Session sweep finished"
                    );
                }
                Some(report)
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Session sweep failed");
                None
            }
            Err(e) => {
                tracing::error!(error = ?e, "Session sweep task panicked");
                None
            }
        }
    }
}
