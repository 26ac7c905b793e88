//! Oneshot 传输 - 内存调用 (需要启用 "in-process" feature)
//!
//! 使用 Tower Service 的 oneshot 模式直接调用 Router，零网络开销。

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::Request;
use tower::ServiceExt;

use super::{RawRequest, RawResponse, Transport};
use crate::error::{ClientError, ClientResult};

/// Oneshot 传输
///
/// ```ignore
/// let router = build_app(&state).with_state(state);
/// let guest = GuestClient::new(OneshotTransport::new(router));
/// ```
#[derive(Debug, Clone)]
pub struct OneshotTransport {
    router: Router,
}

impl OneshotTransport {
    /// `router` 必须已调用 `with_state`
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl Transport for OneshotTransport {
    async fn send(&self, request: RawRequest) -> ClientResult<RawResponse> {
        let mut builder = Request::builder()
            .method(request.method)
            .uri(request.path.as_str());
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        let body = match request.body {
            Some(bytes) => {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        let req = builder
            .body(body)
            .map_err(|e| ClientError::Transport(format!("Failed to build request: {e}")))?;

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .map_err(|e| ClientError::Transport(format!("Oneshot call failed: {e}")))?;

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to read body: {e}")))?;
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn test_oneshot_round_trip() {
        let router = Router::new().route("/ping", get(|| async { axum::Json(true) }));
        let transport = OneshotTransport::new(router);

        let resp = transport.send(RawRequest::get("/ping")).await.unwrap();
        assert!(resp.decode::<bool>().unwrap());

        let missing = transport.send(RawRequest::get("/nope")).await.unwrap();
        assert_eq!(missing.status, http::StatusCode::NOT_FOUND);
    }
}
