//! 会话事件广播
//!
//! 每次提交成功的会话变更都会广播一条 [`SessionEvent`]，
//! 访客通过 SSE 订阅，员工端可据此刷新活动会话列表。

use dashmap::DashMap;
use shared::dto::{SessionEvent, SessionEventKind};
use shared::models::DiningSession;
use shared::util::now_millis;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
pub const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// 会话版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每个会话维护独立的版本号，客户端可通过版本号判断数据新旧。
#[derive(Debug, Default)]
pub struct SessionVersions {
    versions: DashMap<String, u64>,
}

impl SessionVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 递增指定会话的版本号并返回新值 (首次返回 1)
    pub fn increment(&self, session_id: &str) -> u64 {
        let mut entry = self.versions.entry(session_id.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 当前版本号，不存在时返回 0
    pub fn get(&self, session_id: &str) -> u64 {
        self.versions.get(session_id).map(|v| *v).unwrap_or(0)
    }

    /// 会话结束后释放版本号
    pub fn forget(&self, session_id: &str) {
        self.versions.remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// 会话事件总线
#[derive(Debug)]
pub struct SessionEventBus {
    tx: broadcast::Sender<SessionEvent>,
    versions: SessionVersions,
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tx,
            versions: SessionVersions::new(),
        }
    }

    /// 订阅所有会话事件 (调用方按 session_id 过滤)
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn versions(&self) -> &SessionVersions {
        &self.versions
    }

    /// 广播事件 (必须在事务提交之后调用)
    ///
    /// 没有订阅者时发送失败是正常情况，直接忽略。
    pub fn publish(&self, session: &DiningSession, kind: SessionEventKind) -> SessionEvent {
        let event = SessionEvent {
            session_id: session.id.clone(),
            restaurant_id: session.restaurant_id,
            kind,
            status: session.status,
            version: self.versions.increment(&session.id),
            timestamp: now_millis(),
        };
        tracing::debug!(
            session_id = %event.session_id,
            kind = ?event.kind,
            version = event.version,
            "Session event published"
        );
        let _ = self.tx.send(event.clone());
        if session.status.is_terminal() {
            self.versions.forget(&session.id);
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_increment_per_session() {
        let versions = SessionVersions::new();
        assert_eq!(versions.get("s1"), 0);
        assert_eq!(versions.increment("s1"), 1);
        assert_eq!(versions.increment("s1"), 2);
        assert_eq!(versions.increment("s2"), 1);
        assert_eq!(versions.get("s1"), 2);

        versions.forget("s1");
        assert_eq!(versions.get("s1"), 0);
        assert_eq!(versions.len(), 1);
    }
}
