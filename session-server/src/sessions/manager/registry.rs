//! Table registry: QR resolution, table pointers and table administration

use super::{AccessScope, SessionManager, optional_text, require_text};
use crate::sessions::error::{SessionError, SessionResult};
use crate::sessions::tokens::generate_qr_code;
use crate::utils::validation::{MAX_LOCATION_LEN, MAX_TABLE_NUMBER_LEN};
use shared::dto::{GuestTableResponse, SessionSummary};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use shared::util::now_millis;

const MAX_CAPACITY: i32 = 50;

fn validate_capacity(capacity: i32) -> SessionResult<()> {
    if !(1..=MAX_CAPACITY).contains(&capacity) {
        return Err(SessionError::Validation(format!(
            "capacity must be between 1 and {}, got {}",
            MAX_CAPACITY, capacity
        )));
    }
    Ok(())
}

impl SessionManager {
    /// Resolve an active table by its QR code
    ///
    /// Unknown codes and disabled tables both fail.
    pub fn resolve_by_qr_code(&self, qr_code: &str) -> SessionResult<DiningTable> {
        let table_id = self
            .storage
            .find_table_by_qr(qr_code)?
            .ok_or_else(|| SessionError::TableNotFound(qr_code.to_string()))?;
        let table = self
            .storage
            .get_table(table_id)?
            .ok_or_else(|| SessionError::TableNotFound(qr_code.to_string()))?;
        if !table.is_active {
            return Err(SessionError::TableDisabled(table.table_number));
        }
        Ok(table)
    }

    /// Live session pointer of a table
    pub fn current_session(&self, table_id: i64) -> SessionResult<Option<String>> {
        Ok(self.get_table_record(table_id)?.current_session_id)
    }

    fn get_table_record(&self, table_id: i64) -> SessionResult<DiningTable> {
        self.storage
            .get_table(table_id)?
            .ok_or_else(|| SessionError::TableNotFound(table_id.to_string()))
    }

    /// `GET /guest/tables/{qrCode}`: table plus its live session, if any
    pub fn table_view(&self, qr_code: &str) -> SessionResult<GuestTableResponse> {
        let table = self.resolve_by_qr_code(qr_code)?;
        let restaurant = self.load_restaurant(table.restaurant_id)?;

        let active_session = match &table.current_session_id {
            Some(id) => self
                .storage
                .get_session(id)?
                .filter(|s| !s.status.is_terminal())
                .map(|s| SessionSummary::from(&s)),
            None => None,
        };

        Ok(GuestTableResponse {
            table,
            restaurant_name: restaurant.name,
            active_session,
        })
    }

    // ========== Administration ==========

    pub fn get_table(&self, scope: AccessScope, table_id: i64) -> SessionResult<DiningTable> {
        let table = self.get_table_record(table_id)?;
        scope.check(table.restaurant_id)?;
        Ok(table)
    }

    /// Tables of a restaurant ordered by table number
    pub fn list_tables(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
    ) -> SessionResult<Vec<DiningTable>> {
        scope.check(restaurant_id)?;
        let mut tables = self.storage.list_tables(restaurant_id)?;
        tables.sort_by(|a, b| a.table_number.cmp(&b.table_number));
        Ok(tables)
    }

    /// Create a table with a freshly generated QR code
    pub fn create_table(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
        req: &DiningTableCreate,
    ) -> SessionResult<DiningTable> {
        scope.check(restaurant_id)?;
        let table_number = require_text("tableNumber", &req.table_number, MAX_TABLE_NUMBER_LEN)?;
        let location = optional_text("location", req.location.as_deref(), MAX_LOCATION_LEN)?;
        validate_capacity(req.capacity)?;

        let txn = self.storage.begin_write()?;
        self.load_restaurant_txn(&txn, restaurant_id)?;

        let duplicate = self
            .storage
            .list_tables_txn(&txn, restaurant_id)?
            .iter()
            .any(|t| t.table_number == table_number);
        if duplicate {
            return Err(SessionError::TableNumberExists(table_number));
        }

        let qr_code = self.unique_qr_code(&txn)?;
        let now = now_millis();
        let table = DiningTable {
            id: self.storage.next_id(&txn)?,
            restaurant_id,
            table_number,
            capacity: req.capacity,
            location,
            qr_code,
            is_active: true,
            current_session_id: None,
            created_at: now,
            updated_at: now,
        };
        self.storage.put_table(&txn, &table)?;
        self.storage.put_qr_index(&txn, &table.qr_code, table.id)?;
        Self::commit(txn)?;

        tracing::info!(
            table_id = table.id,
            restaurant_id,
            table_number = %table.table_number,
            "Table created"
        );
        Ok(table)
    }

    /// Update capacity, location or active flag
    ///
    /// A table with a live session cannot be disabled.
    pub fn update_table(
        &self,
        scope: AccessScope,
        table_id: i64,
        req: &DiningTableUpdate,
    ) -> SessionResult<DiningTable> {
        if let Some(capacity) = req.capacity {
            validate_capacity(capacity)?;
        }

        let txn = self.storage.begin_write()?;
        let mut table = self
            .storage
            .get_table_txn(&txn, table_id)?
            .ok_or_else(|| SessionError::TableNotFound(table_id.to_string()))?;
        scope.check(table.restaurant_id)?;

        if req.is_active == Some(false)
            && let Some(session_id) = &table.current_session_id
        {
            return Err(SessionError::TableInUse(session_id.clone()));
        }

        if let Some(capacity) = req.capacity {
            table.capacity = capacity;
        }
        if req.location.is_some() {
            table.location = optional_text("location", req.location.as_deref(), MAX_LOCATION_LEN)?;
        }
        if let Some(is_active) = req.is_active {
            table.is_active = is_active;
        }
        table.updated_at = now_millis();

        self.storage.put_table(&txn, &table)?;
        Self::commit(txn)?;
        Ok(table)
    }

    /// Issue a new QR code; the previous code stops resolving
    pub fn regenerate_qr_code(&self, scope: AccessScope, table_id: i64) -> SessionResult<DiningTable> {
        let txn = self.storage.begin_write()?;
        let mut table = self
            .storage
            .get_table_txn(&txn, table_id)?
            .ok_or_else(|| SessionError::TableNotFound(table_id.to_string()))?;
        scope.check(table.restaurant_id)?;

        let qr_code = self.unique_qr_code(&txn)?;
        self.storage.remove_qr_index(&txn, &table.qr_code)?;
        self.storage.put_qr_index(&txn, &qr_code, table.id)?;
        table.qr_code = qr_code;
        table.updated_at = now_millis();
        self.storage.put_table(&txn, &table)?;
        Self::commit(txn)?;

        tracing::info!(table_id, "Table QR code regenerated");
        Ok(table)
    }

    fn unique_qr_code(&self, txn: &redb::WriteTransaction) -> SessionResult<String> {
        for _ in 0..8 {
            let code = generate_qr_code()?;
            if self.storage.find_table_by_qr_txn(txn, &code)?.is_none() {
                return Ok(code);
            }
        }
        Err(SessionError::Internal(
            "Failed to generate a unique QR code".to_string(),
        ))
    }
}
