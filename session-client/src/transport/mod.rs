//! Request transport abstraction
//!
//! Clients build a [`RawRequest`] and decode the [`RawResponse`]; how bytes
//! move is up to the [`Transport`].

pub mod network;
#[cfg(feature = "in-process")]
pub mod oneshot;

use async_trait::async_trait;
use http::{HeaderName, HeaderValue, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::ErrorBody;

use crate::error::{ClientError, ClientResult};

/// Transport-independent request
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: Method,
    /// Path and query, e.g. `/guest/sessions/join`
    pub path: String,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    /// JSON body
    pub body: Option<Vec<u8>>,
}

impl RawRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> ClientResult<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Transport(format!("Invalid header value: {e}")))?;
        self.headers.push((name, value));
        Ok(self)
    }

    pub fn bearer(self, token: &str) -> ClientResult<Self> {
        self.header(http::header::AUTHORIZATION, &format!("Bearer {token}"))
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }
}

/// Transport-independent response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Decode a 2xx body as `T`, anything else as the error envelope
    pub fn decode<T: DeserializeOwned>(self) -> ClientResult<T> {
        if self.status.is_success() {
            return Ok(serde_json::from_slice(&self.body)?);
        }
        Err(self.into_error())
    }

    pub fn into_error(self) -> ClientError {
        match serde_json::from_slice::<ErrorBody>(&self.body) {
            Ok(body) => ClientError::Api {
                code: body.code,
                message: body.message,
                status: body.status,
                details: body.details,
            },
            Err(_) => ClientError::Api {
                code: shared::ErrorCode::Unknown.code(),
                message: String::from_utf8_lossy(&self.body).into_owned(),
                status: self.status.as_u16(),
                details: None,
            },
        }
    }
}

/// Sends requests to the session server
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RawRequest) -> ClientResult<RawResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ErrorCode;

    #[test]
    fn test_decode_success() {
        let resp = RawResponse {
            status: StatusCode::CREATED,
            body: b"true".to_vec(),
        };
        assert!(resp.decode::<bool>().unwrap());
    }

    #[test]
    fn test_decode_envelope() {
        let body = serde_json::json!({
            "code": ErrorCode::EmptyCart.code(),
            "message": "Cart is empty",
            "status": 400,
            "timestamp": "2026-01-01T00:00:00Z",
            "path": "/guest/sessions/x/orders"
        });
        let resp = RawResponse {
            status: StatusCode::BAD_REQUEST,
            body: serde_json::to_vec(&body).unwrap(),
        };
        let err = resp.decode::<bool>().unwrap_err();
        assert_eq!(err.error_code(), Some(ErrorCode::EmptyCart));
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_decode_non_envelope_error() {
        let resp = RawResponse {
            status: StatusCode::BAD_GATEWAY,
            body: b"upstream down".to_vec(),
        };
        match resp.decode::<bool>().unwrap_err() {
            ClientError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
