//! SessionManager - the group dining session core
//!
//! This module handles:
//! - Table resolution and administration (`registry`)
//! - Guest admission, token validation and leave (`membership`)
//! - Shared cart, order submission and totals (`cart`)
//! - The session state machine and waiter calls (`lifecycle`)
//! - Restaurant, menu and staff administration (`admin`)
//! - Staff and guest read models (`queries`)
//!
//! # Mutation Flow
//!
//! ```text
//! operation(...)
//!     ├─ 1. Validate input
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Load aggregate(s) inside the transaction
//!     ├─ 4. Check authorization and state machine
//!     ├─ 5. Mutate and persist
//!     ├─ 6. Commit transaction
//!     ├─ 7. Broadcast SessionEvent
//!     └─ 8. Return result
//! ```
//!
//! The core is synchronous: redb admits a single writer, which serializes
//! every mutation including concurrent joins on the same table.

mod admin;
mod cart;
mod lifecycle;
mod membership;
mod queries;
mod registry;

pub use lifecycle::{JoinOutcome, JoinTarget, SweepReport};
pub use membership::GuestContext;

use super::error::{SessionError, SessionResult};
use super::events::SessionEventBus;
use super::storage::{SessionStorage, StorageError};
use redb::WriteTransaction;
use shared::dto::{SessionEvent, SessionEventKind};
use shared::models::{DiningSession, Restaurant};
use std::path::Path;
use tokio::sync::broadcast;

/// Default admission limit per session
pub const DEFAULT_MAX_GUESTS: usize = 20;

/// Which restaurants a staff caller may act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Platform-wide (`all` permission)
    All,
    Restaurant(i64),
    /// Staff account without a restaurant and without `all`
    Nothing,
}

impl AccessScope {
    pub fn check(&self, restaurant_id: i64) -> SessionResult<()> {
        match self {
            Self::All => Ok(()),
            Self::Restaurant(id) if *id == restaurant_id => Ok(()),
            _ => Err(SessionError::RestaurantMismatch),
        }
    }
}

/// SessionManager for the dining session core
pub struct SessionManager {
    storage: SessionStorage,
    events: SessionEventBus,
    max_guests: usize,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("storage", &"<SessionStorage>")
            .field("events", &"<SessionEventBus>")
            .field("max_guests", &self.max_guests)
            .finish()
    }
}

impl SessionManager {
    /// Open the database at the given path
    pub fn new(db_path: impl AsRef<Path>, max_guests: usize) -> SessionResult<Self> {
        let storage = SessionStorage::open(db_path)?;
        Ok(Self::with_storage(storage).with_max_guests(max_guests))
    }

    /// Create a manager over existing storage
    pub fn with_storage(storage: SessionStorage) -> Self {
        Self {
            storage,
            events: SessionEventBus::new(),
            max_guests: DEFAULT_MAX_GUESTS,
        }
    }

    pub fn with_max_guests(mut self, max_guests: usize) -> Self {
        self.max_guests = max_guests.max(1);
        self
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    pub fn max_guests(&self) -> usize {
        self.max_guests
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current event version of a session
    pub fn session_version(&self, session_id: &str) -> u64 {
        self.events.versions().get(session_id)
    }

    // ========== Shared helpers ==========

    fn commit(txn: WriteTransaction) -> SessionResult<()> {
        txn.commit().map_err(StorageError::from)?;
        Ok(())
    }

    fn publish(&self, session: &DiningSession, kind: SessionEventKind) {
        self.events.publish(session, kind);
    }

    fn load_session_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
    ) -> SessionResult<DiningSession> {
        self.storage
            .get_session_txn(txn, session_id)?
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))
    }

    fn load_session(&self, session_id: &str) -> SessionResult<DiningSession> {
        self.storage
            .get_session(session_id)?
            .ok_or_else(|| SessionError::SessionNotFound(session_id.to_string()))
    }

    fn load_restaurant(&self, restaurant_id: i64) -> SessionResult<Restaurant> {
        self.storage
            .get_restaurant(restaurant_id)?
            .ok_or(SessionError::RestaurantNotFound(restaurant_id))
    }

    fn load_restaurant_txn(
        &self,
        txn: &WriteTransaction,
        restaurant_id: i64,
    ) -> SessionResult<Restaurant> {
        self.storage
            .get_restaurant_txn(txn, restaurant_id)?
            .ok_or(SessionError::RestaurantNotFound(restaurant_id))
    }
}

/// Trimmed, non-empty text no longer than `max` characters
fn require_text(field: &str, value: &str, max: usize) -> SessionResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SessionError::Validation(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > max {
        return Err(SessionError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

/// Optional text; blank becomes `None`
fn optional_text(field: &str, value: Option<&str>, max: usize) -> SessionResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => Err(SessionError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        Some(v) => Ok(Some(v.to_string())),
    }
}

#[cfg(test)]
mod tests;
