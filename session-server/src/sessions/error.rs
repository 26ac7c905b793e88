use super::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderStatus, SessionStatus};
use thiserror::Error;

/// Session core errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(i64),

    #[error("Restaurant is inactive: {0}")]
    RestaurantInactive(i64),

    #[error("Restaurant mismatch")]
    RestaurantMismatch,

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table is disabled: {0}")]
    TableDisabled(String),

    #[error("Table number already exists: {0}")]
    TableNumberExists(String),

    #[error("Table has a live session: {0}")]
    TableInUse(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No live session with code {0}")]
    SessionCodeNotFound(String),

    #[error("Session is {0}")]
    SessionClosed(SessionStatus),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Invalid or revoked guest token")]
    GuestTokenInvalid,

    #[error("Guest limit reached: {0}")]
    GuestLimitReached(usize),

    #[error("Only the host may do this")]
    HostRequired,

    #[error("Cart item belongs to another guest")]
    NotItemOwner,

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(i64),

    #[error("Menu item unavailable: {0}")]
    MenuItemUnavailable(String),

    #[error("Variation not found: {0}")]
    VariationNotFound(i64),

    #[error("Menu category not found: {0}")]
    CategoryNotFound(i64),

    #[error("Menu category {0} still has {1} items")]
    CategoryHasItems(i64, usize),

    #[error("Cart item not found: {0}")]
    CartItemNotFound(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid order transition: {from:?} -> {to:?}")]
    InvalidOrderTransition { from: OrderStatus, to: OrderStatus },

    #[error("Invalid tip: {0}")]
    InvalidTip(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Username already exists: {0}")]
    UsernameExists(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Storage(e) => {
                tracing::error!(error = %e, "Storage error occurred");
                AppError::database(e.to_string())
            }
            SessionError::RestaurantNotFound(id) => {
                AppError::new(ErrorCode::RestaurantNotFound).with_detail("restaurant_id", id)
            }
            SessionError::RestaurantInactive(id) => {
                AppError::new(ErrorCode::RestaurantInactive).with_detail("restaurant_id", id)
            }
            SessionError::RestaurantMismatch => AppError::new(ErrorCode::RestaurantMismatch),
            SessionError::TableNotFound(t) => {
                AppError::new(ErrorCode::TableNotFound).with_detail("table", t)
            }
            SessionError::TableDisabled(t) => {
                AppError::new(ErrorCode::TableDisabled).with_detail("table", t)
            }
            SessionError::TableNumberExists(n) => {
                AppError::new(ErrorCode::TableNumberExists).with_detail("table_number", n)
            }
            SessionError::TableInUse(id) => {
                AppError::new(ErrorCode::TableInUse).with_detail("session_id", id)
            }
            SessionError::SessionNotFound(id) => {
                AppError::new(ErrorCode::SessionNotFound).with_detail("session_id", id)
            }
            SessionError::SessionCodeNotFound(code) => {
                AppError::new(ErrorCode::SessionCodeNotFound).with_detail("session_code", code)
            }
            SessionError::SessionClosed(status) => {
                AppError::new(ErrorCode::SessionClosed).with_detail("status", status.as_str())
            }
            SessionError::InvalidTransition { from, to } => {
                AppError::new(ErrorCode::InvalidTransition)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            SessionError::GuestTokenInvalid => AppError::new(ErrorCode::GuestTokenInvalid),
            SessionError::GuestLimitReached(max) => {
                AppError::new(ErrorCode::GuestLimitReached).with_detail("max_guests", max)
            }
            SessionError::HostRequired => AppError::new(ErrorCode::HostRequired),
            SessionError::NotItemOwner => {
                AppError::forbidden("Only the contributing guest or the host may modify this item")
            }
            SessionError::MenuItemNotFound(id) => {
                AppError::new(ErrorCode::MenuItemNotFound).with_detail("menu_item_id", id)
            }
            SessionError::MenuItemUnavailable(name) => {
                AppError::with_message(
                    ErrorCode::MenuItemUnavailable,
                    format!("Menu item is unavailable: {}", name),
                )
                .with_detail("item_name", name)
            }
            SessionError::VariationNotFound(id) => {
                AppError::new(ErrorCode::VariationNotFound).with_detail("variation_id", id)
            }
            SessionError::CategoryNotFound(id) => {
                AppError::new(ErrorCode::CategoryNotFound).with_detail("category_id", id)
            }
            SessionError::CategoryHasItems(id, count) => {
                AppError::new(ErrorCode::CategoryHasItems)
                    .with_detail("category_id", id)
                    .with_detail("item_count", count)
            }
            SessionError::CartItemNotFound(id) => {
                AppError::new(ErrorCode::CartItemNotFound).with_detail("cart_item_id", id)
            }
            SessionError::EmptyCart => AppError::new(ErrorCode::EmptyCart),
            SessionError::OrderNotFound(id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", id)
            }
            SessionError::InvalidOrderTransition { from, to } => {
                AppError::new(ErrorCode::InvalidOrderTransition)
                    .with_detail("from", format!("{:?}", from).to_uppercase())
                    .with_detail("to", format!("{:?}", to).to_uppercase())
            }
            SessionError::InvalidTip(msg) => AppError::with_message(ErrorCode::InvalidTip, msg),
            SessionError::Validation(msg) => AppError::validation(msg),
            SessionError::UsernameExists(name) => {
                AppError::new(ErrorCode::UsernameExists).with_detail("username", name)
            }
            SessionError::Internal(msg) => AppError::internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_error_mapping() {
        let err: AppError = SessionError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::EmptyCart);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);

        let err: AppError = SessionError::InvalidTransition {
            from: SessionStatus::Cancelled,
            to: SessionStatus::AwaitingPayment,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidTransition);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        let details = err.details.unwrap();
        assert_eq!(details["from"], "CANCELLED");
        assert_eq!(details["to"], "AWAITING_PAYMENT");
    }

    #[test]
    fn test_disabled_table_is_not_found() {
        let err: AppError = SessionError::TableDisabled("qr".into()).into();
        assert_eq!(err.code, ErrorCode::TableDisabled);
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_guest_errors() {
        let err: AppError = SessionError::GuestTokenInvalid.into();
        assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);

        let err: AppError = SessionError::NotItemOwner.into();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let err: AppError = SessionError::GuestLimitReached(20).into();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }
}
