//! Request extractors
//!
//! - [`CurrentUser`]: staff identity, set by `require_auth` or validated here
//! - [`GuestSession`]: raw guest token from `X-Guest-Token` or `?guestToken=`

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::auth::{CurrentUser, JwtService};
use crate::auth::middleware::authenticate;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;
use shared::ErrorCode;

/// Guest token header
pub const GUEST_TOKEN_HEADER: &str = "x-guest-token";

/// `?guestToken=` query string
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuestTokenQuery {
    guest_token: Option<String>,
}

/// JWT Auth Extractor
///
/// Reuses the user stored by `require_auth` when present.
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::unauthorized());
            }
        };

        let user = authenticate(state.get_jwt_service(), token, &parts.uri)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Guest capability token carried by a guest request
///
/// Only the presence of the token is checked here; the session core
/// resolves it against the token index and the target session.
#[derive(Debug, Clone)]
pub struct GuestSession {
    pub token: String,
}

impl GuestSession {
    fn from_parts(parts: &Parts) -> Option<String> {
        let header = parts
            .headers
            .get(GUEST_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(token) = header {
            return Some(token.to_string());
        }

        let Query(query) = Query::<GuestTokenQuery>::try_from_uri(&parts.uri).ok()?;
        query.guest_token.filter(|t| !t.is_empty())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for GuestSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match Self::from_parts(parts) {
            Some(token) => Ok(GuestSession { token }),
            None => {
                security_log!(
                    "WARN",
                    "guest_token_missing",
                    uri = format!("{:?}", parts.uri)
                );
                Err(AppError::new(ErrorCode::GuestTokenInvalid))
            }
        }
    }
}
