//! redb-based storage layer for dining sessions
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `restaurants` | `restaurant_id` | `Restaurant` | Tenants |
//! | `dining_tables` | `table_id` | `DiningTable` | Tables incl. current session pointer |
//! | `menu_categories` | `category_id` | `MenuCategory` | Menu sections |
//! | `menu_items` | `menu_item_id` | `MenuItem` | Menu with variations |
//! | `staff_accounts` | `username` | `StaffAccount` | Staff logins |
//! | `sessions` | `session_id` | `DiningSession` | Session aggregate (guests, cart, orders) |
//! | `table_qr_index` | `qr_code` | `table_id` | QR resolution |
//! | `session_code_index` | `session_code` | `session_id` | Live sessions only |
//! | `guest_token_index` | `sha256(token)` | `GuestTokenEntry` | Guest token validation |
//! | `restaurant_sessions` | `(restaurant_id, session_id)` | `()` | History listing |
//! | `sequence_counter` | `"id"` | `u64` | Crash-safe id sequence |
//!
//! # Transactions
//!
//! Every mutation of the session core runs inside a single `WriteTransaction`.
//! redb admits one writer at a time, so reading a table pointer and writing
//! the new session in the same transaction cannot race with another join.

use redb::{
    AccessGuard, Database, Key, ReadableDatabase, ReadableTable, TableDefinition,
    WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::models::{
    DiningSession, DiningTable, MenuCategory, MenuItem, Restaurant, StaffAccount,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Restaurants: key = restaurant_id, value = JSON Restaurant
const RESTAURANTS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("restaurants");

/// Tables: key = table_id, value = JSON DiningTable
const TABLES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("dining_tables");

/// Menu categories: key = category_id, value = JSON MenuCategory
const MENU_CATEGORIES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("menu_categories");

/// Menu items: key = menu_item_id, value = JSON MenuItem
const MENU_ITEMS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("menu_items");

/// Staff accounts: key = username, value = JSON StaffAccount
const STAFF_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("staff_accounts");

/// Sessions: key = session_id, value = JSON DiningSession
const SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// QR code → table_id
const TABLE_QR_INDEX: TableDefinition<&str, i64> = TableDefinition::new("table_qr_index");

/// Session code → session_id (non-terminal sessions only)
const SESSION_CODE_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("session_code_index");

/// sha256(guest token) hex → JSON GuestTokenEntry
const GUEST_TOKEN_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("guest_token_index");

/// (restaurant_id, session_id) → () for per-restaurant listing
const RESTAURANT_SESSIONS_TABLE: TableDefinition<(i64, &str), ()> =
    TableDefinition::new("restaurant_sessions");

/// Sequence counter: key = "id", value = u64
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const ID_SEQUENCE_KEY: &str = "id";

/// Guest token index entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestTokenEntry {
    pub session_id: String,
    pub guest_id: String,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

fn decode<T: DeserializeOwned>(guard: Option<AccessGuard<'_, &'static [u8]>>) -> StorageResult<Option<T>> {
    match guard {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

fn scan<K, T>(
    table: &impl ReadableTable<K, &'static [u8]>,
    mut keep: impl FnMut(&T) -> bool,
) -> StorageResult<Vec<T>>
where
    K: Key + 'static,
    T: DeserializeOwned,
{
    let mut out = Vec::new();
    for entry in table.iter()? {
        let (_key, value) = entry?;
        let item: T = serde_json::from_slice(value.value())?;
        if keep(&item) {
            out.push(item);
        }
    }
    Ok(out)
}

/// Session storage backed by redb
#[derive(Clone)]
pub struct SessionStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStorage").finish_non_exhaustive()
    }
}

impl SessionStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate`: once `commit()` returns the
    /// session and its table pointer are on disk together.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            // Create all tables if they don't exist
            let _ = write_txn.open_table(RESTAURANTS_TABLE)?;
            let _ = write_txn.open_table(TABLES_TABLE)?;
            let _ = write_txn.open_table(MENU_CATEGORIES_TABLE)?;
            let _ = write_txn.open_table(MENU_ITEMS_TABLE)?;
            let _ = write_txn.open_table(STAFF_TABLE)?;
            let _ = write_txn.open_table(SESSIONS_TABLE)?;
            let _ = write_txn.open_table(TABLE_QR_INDEX)?;
            let _ = write_txn.open_table(SESSION_CODE_INDEX)?;
            let _ = write_txn.open_table(GUEST_TOKEN_INDEX)?;
            let _ = write_txn.open_table(RESTAURANT_SESSIONS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(ID_SEQUENCE_KEY)?.is_none() {
                seq_table.insert(ID_SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Read round-trip used by the health check
    pub fn ping(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(ID_SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    // ========== Sequence ==========

    /// Increment and return the id sequence (within transaction)
    pub fn next_id(&self, txn: &WriteTransaction) -> StorageResult<i64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(ID_SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(ID_SEQUENCE_KEY, next)?;
        Ok(next as i64)
    }

    // ========== Restaurants ==========

    pub fn get_restaurant(&self, id: i64) -> StorageResult<Option<Restaurant>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RESTAURANTS_TABLE)?;
        decode(table.get(id)?)
    }

    pub fn get_restaurant_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<Restaurant>> {
        let table = txn.open_table(RESTAURANTS_TABLE)?;
        decode(table.get(id)?)
    }

    pub fn put_restaurant(&self, txn: &WriteTransaction, restaurant: &Restaurant) -> StorageResult<()> {
        let mut table = txn.open_table(RESTAURANTS_TABLE)?;
        let value = serde_json::to_vec(restaurant)?;
        table.insert(restaurant.id, value.as_slice())?;
        Ok(())
    }

    // ========== Dining Tables ==========

    pub fn get_table(&self, id: i64) -> StorageResult<Option<DiningTable>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLES_TABLE)?;
        decode(table.get(id)?)
    }

    pub fn get_table_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<DiningTable>> {
        let table = txn.open_table(TABLES_TABLE)?;
        decode(table.get(id)?)
    }

    /// Store a table (the QR index is maintained separately)
    pub fn put_table(&self, txn: &WriteTransaction, dining_table: &DiningTable) -> StorageResult<()> {
        let mut table = txn.open_table(TABLES_TABLE)?;
        let value = serde_json::to_vec(dining_table)?;
        table.insert(dining_table.id, value.as_slice())?;
        Ok(())
    }

    /// All tables of a restaurant, ordered by id
    pub fn list_tables(&self, restaurant_id: i64) -> StorageResult<Vec<DiningTable>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLES_TABLE)?;
        scan(&table, |t: &DiningTable| t.restaurant_id == restaurant_id)
    }

    pub fn list_tables_txn(
        &self,
        txn: &WriteTransaction,
        restaurant_id: i64,
    ) -> StorageResult<Vec<DiningTable>> {
        let table = txn.open_table(TABLES_TABLE)?;
        scan(&table, |t: &DiningTable| t.restaurant_id == restaurant_id)
    }

    /// Tables that currently point at a session (across all restaurants)
    pub fn occupied_tables_txn(&self, txn: &WriteTransaction) -> StorageResult<Vec<DiningTable>> {
        let table = txn.open_table(TABLES_TABLE)?;
        scan(&table, |t: &DiningTable| t.current_session_id.is_some())
    }

    // ========== QR Index ==========

    pub fn find_table_by_qr(&self, qr_code: &str) -> StorageResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_QR_INDEX)?;
        Ok(table.get(qr_code)?.map(|guard| guard.value()))
    }

    pub fn find_table_by_qr_txn(
        &self,
        txn: &WriteTransaction,
        qr_code: &str,
    ) -> StorageResult<Option<i64>> {
        let table = txn.open_table(TABLE_QR_INDEX)?;
        Ok(table.get(qr_code)?.map(|guard| guard.value()))
    }

    pub fn put_qr_index(&self, txn: &WriteTransaction, qr_code: &str, table_id: i64) -> StorageResult<()> {
        let mut table = txn.open_table(TABLE_QR_INDEX)?;
        table.insert(qr_code, table_id)?;
        Ok(())
    }

    pub fn remove_qr_index(&self, txn: &WriteTransaction, qr_code: &str) -> StorageResult<()> {
        let mut table = txn.open_table(TABLE_QR_INDEX)?;
        table.remove(qr_code)?;
        Ok(())
    }

    // ========== Menu Categories ==========

    pub fn get_category_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<MenuCategory>> {
        let table = txn.open_table(MENU_CATEGORIES_TABLE)?;
        decode(table.get(id)?)
    }

    pub fn put_category(&self, txn: &WriteTransaction, category: &MenuCategory) -> StorageResult<()> {
        let mut table = txn.open_table(MENU_CATEGORIES_TABLE)?;
        let value = serde_json::to_vec(category)?;
        table.insert(category.id, value.as_slice())?;
        Ok(())
    }

    pub fn remove_category(&self, txn: &WriteTransaction, id: i64) -> StorageResult<()> {
        let mut table = txn.open_table(MENU_CATEGORIES_TABLE)?;
        table.remove(id)?;
        Ok(())
    }

    pub fn list_categories(&self, restaurant_id: i64) -> StorageResult<Vec<MenuCategory>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MENU_CATEGORIES_TABLE)?;
        scan(&table, |c: &MenuCategory| c.restaurant_id == restaurant_id)
    }

    // ========== Menu Items ==========

    pub fn get_menu_item(&self, id: i64) -> StorageResult<Option<MenuItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MENU_ITEMS_TABLE)?;
        decode(table.get(id)?)
    }

    pub fn get_menu_item_txn(
        &self,
        txn: &WriteTransaction,
        id: i64,
    ) -> StorageResult<Option<MenuItem>> {
        let table = txn.open_table(MENU_ITEMS_TABLE)?;
        decode(table.get(id)?)
    }

    pub fn put_menu_item(&self, txn: &WriteTransaction, item: &MenuItem) -> StorageResult<()> {
        let mut table = txn.open_table(MENU_ITEMS_TABLE)?;
        let value = serde_json::to_vec(item)?;
        table.insert(item.id, value.as_slice())?;
        Ok(())
    }

    pub fn list_menu_items(&self, restaurant_id: i64) -> StorageResult<Vec<MenuItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MENU_ITEMS_TABLE)?;
        scan(&table, |m: &MenuItem| m.restaurant_id == restaurant_id)
    }

    /// Items filed under a category
    pub fn category_items_txn(
        &self,
        txn: &WriteTransaction,
        category_id: i64,
    ) -> StorageResult<Vec<MenuItem>> {
        let table = txn.open_table(MENU_ITEMS_TABLE)?;
        scan(&table, |m: &MenuItem| m.category_id == Some(category_id))
    }

    // ========== Staff Accounts ==========

    pub fn get_staff(&self, username: &str) -> StorageResult<Option<StaffAccount>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STAFF_TABLE)?;
        decode(table.get(username)?)
    }

    pub fn get_staff_txn(
        &self,
        txn: &WriteTransaction,
        username: &str,
    ) -> StorageResult<Option<StaffAccount>> {
        let table = txn.open_table(STAFF_TABLE)?;
        decode(table.get(username)?)
    }

    pub fn put_staff(&self, txn: &WriteTransaction, account: &StaffAccount) -> StorageResult<()> {
        let mut table = txn.open_table(STAFF_TABLE)?;
        let value = serde_json::to_vec(account)?;
        table.insert(account.username.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn count_staff_txn(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        use redb::ReadableTableMetadata;
        let table = txn.open_table(STAFF_TABLE)?;
        Ok(table.len()?)
    }

    // ========== Sessions ==========

    pub fn get_session(&self, id: &str) -> StorageResult<Option<DiningSession>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS_TABLE)?;
        decode(table.get(id)?)
    }

    pub fn get_session_txn(
        &self,
        txn: &WriteTransaction,
        id: &str,
    ) -> StorageResult<Option<DiningSession>> {
        let table = txn.open_table(SESSIONS_TABLE)?;
        decode(table.get(id)?)
    }

    /// Store a session aggregate and index it under its restaurant
    pub fn put_session(&self, txn: &WriteTransaction, session: &DiningSession) -> StorageResult<()> {
        let mut table = txn.open_table(SESSIONS_TABLE)?;
        let value = serde_json::to_vec(session)?;
        table.insert(session.id.as_str(), value.as_slice())?;

        let mut by_restaurant = txn.open_table(RESTAURANT_SESSIONS_TABLE)?;
        by_restaurant.insert((session.restaurant_id, session.id.as_str()), ())?;
        Ok(())
    }

    /// All sessions of a restaurant (unordered)
    pub fn list_sessions(&self, restaurant_id: i64) -> StorageResult<Vec<DiningSession>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(RESTAURANT_SESSIONS_TABLE)?;
        let sessions = read_txn.open_table(SESSIONS_TABLE)?;

        let mut out = Vec::new();
        for entry in index.range((restaurant_id, "")..(restaurant_id + 1, ""))? {
            let (key, _value) = entry?;
            let (_, session_id) = key.value();
            if let Some(session) = decode::<DiningSession>(sessions.get(session_id)?)? {
                out.push(session);
            }
        }
        Ok(out)
    }

    // ========== Session Code Index ==========

    pub fn find_session_by_code(&self, code: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSION_CODE_INDEX)?;
        Ok(table.get(code)?.map(|guard| guard.value().to_string()))
    }

    pub fn find_session_by_code_txn(
        &self,
        txn: &WriteTransaction,
        code: &str,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(SESSION_CODE_INDEX)?;
        Ok(table.get(code)?.map(|guard| guard.value().to_string()))
    }

    pub fn put_session_code(
        &self,
        txn: &WriteTransaction,
        code: &str,
        session_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SESSION_CODE_INDEX)?;
        table.insert(code, session_id)?;
        Ok(())
    }

    pub fn remove_session_code(&self, txn: &WriteTransaction, code: &str) -> StorageResult<()> {
        let mut table = txn.open_table(SESSION_CODE_INDEX)?;
        table.remove(code)?;
        Ok(())
    }

    /// Ids of all live sessions (those still holding a session code)
    pub fn live_session_ids_txn(&self, txn: &WriteTransaction) -> StorageResult<Vec<String>> {
        let table = txn.open_table(SESSION_CODE_INDEX)?;
        let mut ids = Vec::new();
        for entry in table.iter()? {
            let (_key, value) = entry?;
            ids.push(value.value().to_string());
        }
        Ok(ids)
    }

    // ========== Guest Token Index ==========

    pub fn find_guest_token(&self, token_hash: &str) -> StorageResult<Option<GuestTokenEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GUEST_TOKEN_INDEX)?;
        decode(table.get(token_hash)?)
    }

    pub fn find_guest_token_txn(
        &self,
        txn: &WriteTransaction,
        token_hash: &str,
    ) -> StorageResult<Option<GuestTokenEntry>> {
        let table = txn.open_table(GUEST_TOKEN_INDEX)?;
        decode(table.get(token_hash)?)
    }

    pub fn put_guest_token(
        &self,
        txn: &WriteTransaction,
        token_hash: &str,
        entry: &GuestTokenEntry,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(GUEST_TOKEN_INDEX)?;
        let value = serde_json::to_vec(entry)?;
        table.insert(token_hash, value.as_slice())?;
        Ok(())
    }

    pub fn remove_guest_token(&self, txn: &WriteTransaction, token_hash: &str) -> StorageResult<()> {
        let mut table = txn.open_table(GUEST_TOKEN_INDEX)?;
        table.remove(token_hash)?;
        Ok(())
    }

    /// Drop every token whose entry matches `stale`; returns how many were removed
    pub fn purge_guest_tokens_txn(
        &self,
        txn: &WriteTransaction,
        mut stale: impl FnMut(&GuestTokenEntry) -> StorageResult<bool>,
    ) -> StorageResult<usize> {
        let mut table = txn.open_table(GUEST_TOKEN_INDEX)?;
        let mut doomed = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let token: GuestTokenEntry = serde_json::from_slice(value.value())?;
            if stale(&token)? {
                doomed.push(key.value().to_string());
            }
        }
        for hash in &doomed {
            table.remove(hash.as_str())?;
        }
        Ok(doomed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{PaymentStatus, SessionStatus, SessionTotals};

    fn restaurant(id: i64) -> Restaurant {
        Restaurant {
            id,
            name: format!("Restaurant {id}"),
            tax_rate: Decimal::new(8, 2),
            service_charge_rate: Decimal::ZERO,
            currency: "USD".into(),
            is_active: true,
            created_at: 0,
        }
    }

    fn session(id: &str, restaurant_id: i64) -> DiningSession {
        DiningSession {
            id: id.into(),
            session_code: "ABC123".into(),
            restaurant_id,
            table_id: 1,
            table_number: "T1".into(),
            status: SessionStatus::Active,
            host_guest_id: None,
            host_name: None,
            host_phone: None,
            special_requests: None,
            totals: SessionTotals::default(),
            tax_rate: Decimal::ZERO,
            service_charge_rate: Decimal::ZERO,
            payment_status: PaymentStatus::Pending,
            waiter_called: false,
            waiter_call_time: None,
            waiter_response_time: None,
            started_at: 0,
            ended_at: None,
            last_activity_at: 0,
            created_at: 0,
            updated_at: 0,
            guests: vec![],
            cart_items: vec![],
            orders: vec![],
        }
    }

    #[test]
    fn test_next_id_is_monotonic() {
        let storage = SessionStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let a = storage.next_id(&txn).unwrap();
        let b = storage.next_id(&txn).unwrap();
        txn.commit().unwrap();
        assert_eq!(b, a + 1);

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_id(&txn).unwrap(), b + 1);
        txn.commit().unwrap();
        assert_eq!(storage.ping().unwrap(), (b + 1) as u64);
    }

    #[test]
    fn test_uncommitted_write_is_invisible() {
        let storage = SessionStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_restaurant(&txn, &restaurant(1)).unwrap();
        assert!(storage.get_restaurant_txn(&txn, 1).unwrap().is_some());
        drop(txn);
        assert!(storage.get_restaurant(1).unwrap().is_none());
    }

    #[test]
    fn test_sessions_listed_per_restaurant() {
        let storage = SessionStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_session(&txn, &session("s1", 1)).unwrap();
        storage.put_session(&txn, &session("s2", 1)).unwrap();
        storage.put_session(&txn, &session("s3", 2)).unwrap();
        txn.commit().unwrap();

        let mut ids: Vec<String> = storage
            .list_sessions(1)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert_eq!(storage.list_sessions(2).unwrap().len(), 1);
        assert!(storage.list_sessions(3).unwrap().is_empty());
    }

    #[test]
    fn test_session_code_index() {
        let storage = SessionStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        storage.put_session_code(&txn, "ABC123", "s1").unwrap();
        txn.commit().unwrap();
        assert_eq!(
            storage.find_session_by_code("ABC123").unwrap().as_deref(),
            Some("s1")
        );

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.live_session_ids_txn(&txn).unwrap(), vec!["s1"]);
        storage.remove_session_code(&txn, "ABC123").unwrap();
        txn.commit().unwrap();
        assert!(storage.find_session_by_code("ABC123").unwrap().is_none());
    }

    #[test]
    fn test_purge_guest_tokens() {
        let storage = SessionStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        for (hash, session_id) in [("h1", "s1"), ("h2", "s2"), ("h3", "s1")] {
            let entry = GuestTokenEntry {
                session_id: session_id.into(),
                guest_id: format!("g-{hash}"),
            };
            storage.put_guest_token(&txn, hash, &entry).unwrap();
        }
        let removed = storage
            .purge_guest_tokens_txn(&txn, |e| Ok(e.session_id == "s1"))
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(removed, 2);
        assert!(storage.find_guest_token("h1").unwrap().is_none());
        assert!(storage.find_guest_token("h2").unwrap().is_some());
    }
}
