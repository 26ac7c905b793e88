//! Unified error codes for the dining session service
//!
//! Error codes are shared by the server, the Rust client and the web
//! frontend. They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Restaurant errors
//! - 4xxx: Session errors
//! - 5xxx: Cart and order errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: Staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Guest token unknown, revoked, or its session has ended
    GuestTokenInvalid = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Resource belongs to another restaurant
    RestaurantMismatch = 2010,
    /// Only the session host may perform this action
    HostRequired = 2011,

    // ==================== 3xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,
    /// Restaurant is inactive
    RestaurantInactive = 3002,

    // ==================== 4xxx: Session ====================
    /// Dining session not found
    SessionNotFound = 4001,
    /// Session no longer accepts this operation
    SessionClosed = 4002,
    /// Lifecycle state machine violation
    InvalidTransition = 4003,
    /// No live session for this code
    SessionCodeNotFound = 4004,
    /// Guest not found in session
    GuestNotFound = 4005,
    /// Session guest limit reached
    GuestLimitReached = 4006,
    /// Tip amount invalid
    InvalidTip = 4007,

    // ==================== 5xxx: Cart / Order ====================
    /// Nothing pending to submit
    EmptyCart = 5001,
    /// Cart item not found
    CartItemNotFound = 5002,
    /// Order not found
    OrderNotFound = 5003,
    /// Order status cannot move that way
    InvalidOrderTransition = 5004,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item is inactive or unavailable
    MenuItemUnavailable = 6002,
    /// Menu item variation not found
    VariationNotFound = 6003,
    /// Menu category not found
    CategoryNotFound = 6004,
    /// Menu category still has items
    CategoryHasItems = 6005,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is disabled
    TableDisabled = 7002,
    /// Table number already used in this restaurant
    TableNumberExists = 7003,
    /// Table has a live session
    TableInUse = 7004,

    // ==================== 8xxx: Staff ====================
    /// Staff account not found
    StaffNotFound = 8001,
    /// Username already taken
    UsernameExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Operation timed out
    TimeoutError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::GuestTokenInvalid => "Guest token is invalid or the session has ended",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::RestaurantMismatch => "Resource belongs to another restaurant",
            ErrorCode::HostRequired => "Only the session host can do this",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::RestaurantInactive => "Restaurant is inactive",

            // Session
            ErrorCode::SessionNotFound => "Dining session not found",
            ErrorCode::SessionClosed => "Dining session is not active",
            ErrorCode::InvalidTransition => "Session status transition not allowed",
            ErrorCode::SessionCodeNotFound => "No live session for this code",
            ErrorCode::GuestNotFound => "Guest not found",
            ErrorCode::GuestLimitReached => "Session guest limit reached",
            ErrorCode::InvalidTip => "Tip amount is invalid",

            // Cart / Order
            ErrorCode::EmptyCart => "Cart is empty",
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidOrderTransition => "Order status transition not allowed",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::VariationNotFound => "Menu item variation not found",
            ErrorCode::CategoryNotFound => "Menu category not found",
            ErrorCode::CategoryHasItems => "Menu category still has items",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableDisabled => "Table is disabled",
            ErrorCode::TableNumberExists => "Table number already exists",
            ErrorCode::TableInUse => "Table has a live session",

            // Staff
            ErrorCode::StaffNotFound => "Staff account not found",
            ErrorCode::UsernameExists => "Username already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1010 => Ok(ErrorCode::GuestTokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2010 => Ok(ErrorCode::RestaurantMismatch),
            2011 => Ok(ErrorCode::HostRequired),

            // Restaurant
            3001 => Ok(ErrorCode::RestaurantNotFound),
            3002 => Ok(ErrorCode::RestaurantInactive),

            // Session
            4001 => Ok(ErrorCode::SessionNotFound),
            4002 => Ok(ErrorCode::SessionClosed),
            4003 => Ok(ErrorCode::InvalidTransition),
            4004 => Ok(ErrorCode::SessionCodeNotFound),
            4005 => Ok(ErrorCode::GuestNotFound),
            4006 => Ok(ErrorCode::GuestLimitReached),
            4007 => Ok(ErrorCode::InvalidTip),

            // Cart / Order
            5001 => Ok(ErrorCode::EmptyCart),
            5002 => Ok(ErrorCode::CartItemNotFound),
            5003 => Ok(ErrorCode::OrderNotFound),
            5004 => Ok(ErrorCode::InvalidOrderTransition),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemUnavailable),
            6003 => Ok(ErrorCode::VariationNotFound),
            6004 => Ok(ErrorCode::CategoryNotFound),
            6005 => Ok(ErrorCode::CategoryHasItems),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableDisabled),
            7003 => Ok(ErrorCode::TableNumberExists),
            7004 => Ok(ErrorCode::TableInUse),

            // Staff
            8001 => Ok(ErrorCode::StaffNotFound),
            8002 => Ok(ErrorCode::UsernameExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9005 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
