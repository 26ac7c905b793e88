//! Group Dining Session Module
//!
//! - **storage**: redb persistence for restaurants, tables, menu, staff,
//!   session aggregates and their secondary indexes
//! - **manager**: SessionManager, the synchronous session core
//! - **money**: Decimal totals, rounding and bill split
//! - **events**: post-commit SessionEvent broadcast
//! - **tokens**: guest token and QR code generation
//! - **sweeper**: periodic idle-session cleanup
//!
//! # Architecture
//!
//! ```text
//! HTTP handler → SessionManager → WriteTransaction (redb) → commit
//!                                                            ↓
//!                                                   SessionEventBus
//!                                                            ↓
//!                                                   SSE subscribers
//! ```

pub mod error;
pub mod events;
pub mod manager;
pub mod money;
pub mod storage;
pub mod sweeper;
pub mod tokens;

// Re-exports
pub use error::{SessionError, SessionResult};
pub use events::SessionEventBus;
pub use manager::{AccessScope, GuestContext, JoinOutcome, JoinTarget, SessionManager, SweepReport};
pub use storage::{SessionStorage, StorageError};
pub use sweeper::SessionSweeper;
