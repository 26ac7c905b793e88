//! Authentication Handlers
//!
//! Handles login, token refresh and the current user

use std::time::Duration;

use axum::{Json, extract::State};

use crate::auth::permissions::get_default_permissions;
use crate::auth::{CurrentUser, JwtError, verify_password};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::validation::{MAX_PASSWORD_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::client::{LoginRequest, LoginResponse, RefreshRequest, UserInfo};
use shared::models::StaffAccount;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

const MAX_USERNAME_LEN: usize = 64;

/// Login handler
///
/// Unknown user, wrong password and disabled account all return the same error.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_required_text(&req.username, "username", MAX_USERNAME_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;

    let username = req.username.trim().to_string();
    let account = state.sessions.find_staff(&username)?;

    // Fixed delay before checking the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let account = match account {
        Some(a) if a.is_active && verify_password(&req.password, &a.password_hash) => a,
        _ => {
            security_log!("WARN", "login_failed", username = username.clone());
            return Err(AppError::invalid_credentials());
        }
    };

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = account.role.as_str(),
        "Staff logged in"
    );

    Ok(Json(issue_tokens(&state, &account)?))
}

/// Exchange a refresh token for a new token pair
///
/// The account is re-read so a disabled account cannot refresh.
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<LoginResponse>> {
    let claims = state
        .get_jwt_service()
        .validate_refresh_token(&req.refresh_token)
        .map_err(|e| {
            security_log!("WARN", "refresh_failed", error = format!("{}", e));
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid refresh token"),
            }
        })?;

    let account = state
        .sessions
        .find_staff(&claims.username)?
        .filter(|a| a.is_active && a.id.to_string() == claims.sub)
        .ok_or_else(|| {
            security_log!("WARN", "refresh_rejected", username = claims.username.clone());
            AppError::invalid_token("Invalid refresh token")
        })?;

    Ok(Json(issue_tokens(&state, &account)?))
}

/// Get current user info
pub async fn me(user: CurrentUser) -> Json<UserInfo> {
    Json(user.to_user_info())
}

fn issue_tokens(state: &ServerState, account: &StaffAccount) -> AppResult<LoginResponse> {
    let jwt = state.get_jwt_service();
    let permissions = get_default_permissions(account.role);

    let access_token = jwt
        .generate_access_token(account, &permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;
    let refresh_token = jwt
        .generate_refresh_token(account, &permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    Ok(LoginResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt.access_expires_in_secs(),
        user: UserInfo {
            id: account.id,
            username: account.username.clone(),
            role: account.role.as_str().to_string(),
            permissions,
            restaurant_id: account.restaurant_id,
        },
    })
}
