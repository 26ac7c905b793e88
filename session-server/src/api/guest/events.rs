//! 会话事件流 (SSE)
//!
//! 访客订阅自己所在会话的 [`SessionEvent`]。会话进入终态后发送最后一条事件并关闭流；
//! 有访客离开时重新校验令牌，订阅者自己离开则立即关闭。

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use shared::dto::{SessionEvent, SessionEventKind};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::auth::GuestSession;
use crate::core::ServerState;
use crate::sessions::SessionError;
use crate::utils::AppResult;

/// SSE 事件名
const EVENT_NAME: &str = "session";

/// GET /guest/sessions/{id}/events
pub async fn stream(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    guest: GuestSession,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let ctx = state.sessions.validate_token(&guest.token)?;
    if ctx.session_id != session_id {
        return Err(SessionError::GuestTokenInvalid.into());
    }

    tracing::debug!(session_id = %session_id, guest_id = %ctx.guest_id, "Guest subscribed to events");
    let rx = state.sessions.subscribe();
    let sessions = state.sessions.clone();
    let token = guest.token;
    let still_member = move || sessions.validate_token(&token).is_ok();
    Ok(Sse::new(session_events(rx, session_id, still_member)).keep_alive(KeepAlive::default()))
}

/// 过滤出指定会话的事件，终态事件之后结束
///
/// `still_member` 在每个 `GuestLeft` 事件上调用，返回 false 时结束流。
fn session_events<F>(
    rx: broadcast::Receiver<SessionEvent>,
    session_id: String,
    still_member: F,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    F: Fn() -> bool + Send + 'static,
{
    futures::stream::unfold(Some((rx, session_id, still_member)), |state| async move {
        let (mut rx, session_id, still_member) = state?;
        loop {
            match rx.recv().await {
                Ok(event)
                    if event.session_id == session_id
                        && event.kind == SessionEventKind::GuestLeft
                        && !still_member() =>
                {
                    tracing::debug!(session_id = %session_id, "Subscriber left, closing event stream");
                    return None;
                }
                Ok(event) if event.session_id == session_id => {
                    let closing = event.status.is_terminal();
                    let sse = Event::default()
                        .event(EVENT_NAME)
                        .json_data(&event)
                        .unwrap_or_else(|_| Event::default().comment("encode failed"));
                    let next = (!closing).then_some((rx, session_id, still_member));
                    return Some((Ok::<Event, Infallible>(sse), next));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(session_id = %session_id, skipped, "Event subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use shared::models::SessionStatus;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn event(session_id: &str, status: SessionStatus, version: u64) -> SessionEvent {
        event_of(session_id, SessionEventKind::StatusChanged, status, version)
    }

    fn event_of(
        session_id: &str,
        kind: SessionEventKind,
        status: SessionStatus,
        version: u64,
    ) -> SessionEvent {
        SessionEvent {
            session_id: session_id.to_string(),
            restaurant_id: 1,
            kind,
            status,
            version,
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn test_stream_filters_and_closes_on_terminal() {
        let (tx, rx) = broadcast::channel(16);
        let stream = session_events(rx, "s1".to_string(), || true);

        tx.send(event("other", SessionStatus::Active, 1)).unwrap();
        tx.send(event("s1", SessionStatus::Paused, 1)).unwrap();
        tx.send(event("s1", SessionStatus::Completed, 2)).unwrap();
        tx.send(event("s1", SessionStatus::Active, 3)).unwrap();

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_stream_ends_when_bus_closes() {
        let (tx, rx) = broadcast::channel::<SessionEvent>(4);
        let stream = session_events(rx, "s1".to_string(), || true);
        drop(tx);
        let items: Vec<_> = stream.collect().await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_stream_closes_when_subscriber_leaves() {
        let (tx, rx) = broadcast::channel(16);
        let member = Arc::new(AtomicBool::new(true));
        let flag = member.clone();
        let stream = session_events(rx, "s1".to_string(), move || flag.load(Ordering::SeqCst));

        tx.send(event("s1", SessionStatus::Active, 1)).unwrap();
        // Another guest left; the subscriber is still a member
        tx.send(event_of("s1", SessionEventKind::GuestLeft, SessionStatus::Active, 2))
            .unwrap();
        let mut stream = Box::pin(stream);
        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_some());

        member.store(false, Ordering::SeqCst);
        tx.send(event_of("s1", SessionEventKind::GuestLeft, SessionStatus::Active, 3))
            .unwrap();
        tx.send(event("s1", SessionStatus::Active, 4)).unwrap();
        assert!(stream.next().await.is_none());
    }
}
