//! API request/response payloads
//!
//! Bodies are camelCase JSON. Success responses are the raw payload; failures
//! use [`crate::error::ErrorBody`].

pub mod guest;
pub mod session;

pub use guest::*;
pub use session::*;
