//! Data models
//!
//! Persisted entities shared between session-server and its clients.
//! Administrative resources use `i64` ids from the storage sequence;
//! session-scoped records use UUID v4 strings.

pub mod menu;
pub mod order;
pub mod restaurant;
pub mod session;
pub mod staff;
pub mod table;

// Re-exports
pub use menu::*;
pub use order::*;
pub use restaurant::*;
pub use session::*;
pub use staff::*;
pub use table::*;
