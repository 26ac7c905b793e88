//! Session Client - HTTP client for the dining session server
//!
//! - [`StaffClient`]: JWT login, one refresh-and-retry on 401
//! - [`GuestClient`]: QR / code join, cart, orders, bill
//!
//! Both run over any [`Transport`]: [`NetworkTransport`] (reqwest) or, with
//! the `in-process` feature, [`OneshotTransport`] calling the router directly.

pub mod credentials;
pub mod error;
pub mod guest;
pub mod staff;
pub mod transport;

pub use credentials::{CredentialStore, Credentials, MemoryCredentialStore};
pub use error::{ClientError, ClientResult};
pub use guest::GuestClient;
pub use staff::StaffClient;
pub use transport::network::NetworkTransport;
#[cfg(feature = "in-process")]
pub use transport::oneshot::OneshotTransport;
pub use transport::{RawRequest, RawResponse, Transport};

// Re-export shared types for convenience
pub use shared::client::{HealthResponse, LoginResponse, UserInfo};
