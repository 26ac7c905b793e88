//! Error envelope middleware
//!
//! Every failing response leaves as an [`ErrorBody`] carrying the request
//! path. Handler errors arrive as an [`AppError`] in the response
//! extensions; framework rejections (bad JSON, unknown route, timeout) are
//! plain responses and get an envelope derived from their status.

use axum::{
    Json,
    body::to_bytes,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use shared::error::{AppError, ErrorBody, ErrorCode};

/// Upper bound for reading a rejection body into the error message
const MAX_REJECTION_BODY: usize = 16 * 1024;

pub async fn error_envelope(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    if let Some(err) = response.extensions().get::<AppError>().cloned() {
        let body = ErrorBody::from_error(&err, Some(&path));
        let (mut parts, _) = response.into_parts();
        parts.headers.remove(http::header::CONTENT_LENGTH);
        let rebuilt = Json(body).into_response();
        let (rebuilt_parts, rebuilt_body) = rebuilt.into_parts();
        parts.headers.extend(rebuilt_parts.headers);
        return Response::from_parts(parts, rebuilt_body);
    }

    let (mut parts, body) = response.into_parts();
    let message = match to_bytes(body, MAX_REJECTION_BODY).await {
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    let err = AppError::with_message(code_for_status(status), message);
    let mut body = ErrorBody::from_error(&err, Some(&path));
    body.status = status.as_u16();

    parts.headers.remove(http::header::CONTENT_LENGTH);
    parts.headers.remove(http::header::CONTENT_TYPE);
    let (rebuilt_parts, rebuilt_body) = Json(body).into_response().into_parts();
    parts.headers.extend(rebuilt_parts.headers);
    Response::from_parts(parts, rebuilt_body)
}

fn code_for_status(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::UNAUTHORIZED => ErrorCode::NotAuthenticated,
        StatusCode::FORBIDDEN => ErrorCode::PermissionDenied,
        StatusCode::REQUEST_TIMEOUT | StatusCode::SERVICE_UNAVAILABLE => ErrorCode::TimeoutError,
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            ErrorCode::InvalidFormat
        }
        s if s.is_server_error() => ErrorCode::InternalError,
        _ => ErrorCode::InvalidRequest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    async fn failing() -> Result<(), AppError> {
        Err(AppError::new(ErrorCode::SessionNotFound).with_detail("session_id", "s1"))
    }

    fn app() -> Router {
        Router::new()
            .route("/guest/sessions/s1", get(failing))
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(error_envelope))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_app_error_gets_path() {
        let response = app()
            .oneshot(Request::get("/guest/sessions/s1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["code"], 4001);
        assert_eq!(json["status"], 404);
        assert_eq!(json["path"], "/guest/sessions/s1");
        assert_eq!(json["details"]["session_id"], "s1");
    }

    #[tokio::test]
    async fn test_unknown_route_enveloped() {
        let response = app()
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["code"], 3);
        assert_eq!(json["path"], "/nowhere");
    }

    #[tokio::test]
    async fn test_success_untouched() {
        let response = app()
            .oneshot(Request::get("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"fine");
    }
}
