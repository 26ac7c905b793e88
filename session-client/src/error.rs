//! Client error types

use std::collections::HashMap;

use serde_json::Value;
use shared::ErrorCode;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server returned an error envelope
    #[error("API error {code} ({status}): {message}")]
    Api {
        code: u16,
        message: String,
        status: u16,
        details: Option<HashMap<String, Value>>,
    },

    /// Not logged in, or the refresh attempt failed
    #[error("Authentication required")]
    Unauthorized,

    /// Guest call before a successful join
    #[error("Not joined to a session")]
    NotJoined,

    /// Request could not be sent or the response not read
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected type
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Typed error code of an [`ClientError::Api`] error
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => ErrorCode::try_from(*code).ok(),
            _ => None,
        }
    }

    /// HTTP status of an [`ClientError::Api`] error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_lookup() {
        let err = ClientError::Api {
            code: ErrorCode::NotAuthenticated.code(),
            message: "no".into(),
            status: 401,
            details: None,
        };
        assert_eq!(err.error_code(), Some(ErrorCode::NotAuthenticated));
        assert_eq!(err.status(), Some(401));
        assert_eq!(ClientError::Unauthorized.error_code(), None);
    }
}
