//! Session lifecycle: join-or-create, state transitions, waiter calls, sweeping

use super::{AccessScope, SessionManager, optional_text};
use crate::sessions::error::{SessionError, SessionResult};
use crate::utils::validation::MAX_NOTE_LEN;
use redb::WriteTransaction;
use shared::dto::{JoinSessionResponse, SessionEventKind, SessionSummary};
use shared::models::{
    DiningSession, DiningTable, PaymentStatus, SessionGuest, SessionStatus, SessionTotals,
};
use shared::util::{generate_session_code, normalize_session_code, now_millis};

/// Attempts before giving up on a unique session code
const SESSION_CODE_ATTEMPTS: usize = 16;

/// How a guest identifies the table to sit at
#[derive(Debug, Clone, Copy)]
pub enum JoinTarget<'a> {
    QrCode(&'a str),
    TableId(i64),
}

/// Result of a successful join
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub session: DiningSession,
    pub table: DiningTable,
    pub guest: SessionGuest,
    /// Raw guest token, only available here
    pub guest_token: String,
    /// Whether this join opened the session
    pub created: bool,
}

impl JoinOutcome {
    pub fn into_response(self) -> JoinSessionResponse {
        JoinSessionResponse {
            session_id: self.session.id.clone(),
            session_token: self.session.session_code.clone(),
            guest_token: self.guest_token,
            guest_id: self.guest.id,
            guest_name: self.guest.name,
            is_host: self.guest.is_host,
            session: SessionSummary::from(&self.session),
            table: self.table,
            guests: self.session.guests,
            cart_items: self.session.cart_items,
            orders: self.session.orders,
        }
    }
}

/// What one sweeper pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Idle sessions cancelled
    pub cancelled: Vec<String>,
    /// Tables whose dangling pointer was cleared
    pub reconciled_tables: Vec<i64>,
    /// Guest token index entries of ended sessions removed
    pub purged_tokens: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.cancelled.is_empty() && self.reconciled_tables.is_empty() && self.purged_tokens == 0
    }
}

impl SessionManager {
    /// Join the live session of a table, or open one
    ///
    /// Runs in a single write transaction: reading the table pointer, creating
    /// the session, setting the pointer and admitting the host all commit
    /// together.
    pub fn create_or_join(
        &self,
        target: JoinTarget<'_>,
        guest_name: &str,
        phone: Option<&str>,
        special_requests: Option<&str>,
        expected_restaurant: Option<i64>,
    ) -> SessionResult<JoinOutcome> {
        let special_requests = optional_text("specialRequests", special_requests, MAX_NOTE_LEN)?;

        let txn = self.storage.begin_write()?;
        let mut table = self.resolve_table_txn(&txn, target)?;
        if expected_restaurant.is_some_and(|id| id != table.restaurant_id) {
            return Err(SessionError::RestaurantMismatch);
        }
        let restaurant = self.load_restaurant_txn(&txn, table.restaurant_id)?;
        if !restaurant.is_active {
            return Err(SessionError::RestaurantInactive(restaurant.id));
        }

        let now = now_millis();
        let live = match &table.current_session_id {
            Some(id) => match self.storage.get_session_txn(&txn, id)? {
                Some(s) if !s.status.is_terminal() => Some(s),
                _ => {
                    tracing::warn!(
                        table_id = table.id,
                        session_id = %id,
                        "Table points at a missing or ended session, opening a new one"
                    );
                    None
                }
            },
            None => None,
        };

        let (mut session, created) = match live {
            Some(session) => (session, false),
            None => {
                let code = self.unique_session_code(&txn)?;
                let session = DiningSession {
                    id: uuid::Uuid::new_v4().to_string(),
                    session_code: code,
                    restaurant_id: table.restaurant_id,
                    table_id: table.id,
                    table_number: table.table_number.clone(),
                    status: SessionStatus::Active,
                    host_guest_id: None,
                    host_name: None,
                    host_phone: None,
                    special_requests,
                    totals: SessionTotals::default(),
                    tax_rate: restaurant.tax_rate,
                    service_charge_rate: restaurant.service_charge_rate,
                    payment_status: PaymentStatus::Pending,
                    waiter_called: false,
                    waiter_call_time: None,
                    waiter_response_time: None,
                    started_at: now,
                    ended_at: None,
                    last_activity_at: now,
                    created_at: now,
                    updated_at: now,
                    guests: vec![],
                    cart_items: vec![],
                    orders: vec![],
                };
                table.current_session_id = Some(session.id.clone());
                table.updated_at = now;
                self.storage.put_table(&txn, &table)?;
                self.storage
                    .put_session_code(&txn, &session.session_code, &session.id)?;
                (session, true)
            }
        };

        let (guest, guest_token) = self.admit_txn(&txn, &mut session, guest_name, phone, now)?;
        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        if created {
            tracing::info!(
                session_id = %session.id,
                session_code = %session.session_code,
                table_id = table.id,
                "Dining session opened"
            );
            self.publish(&session, SessionEventKind::Created);
        }
        self.publish(&session, SessionEventKind::GuestJoined);

        Ok(JoinOutcome {
            session,
            table,
            guest,
            guest_token,
            created,
        })
    }

    /// Join the live session owning a shareable code
    pub fn join_by_code(
        &self,
        code: &str,
        guest_name: &str,
        phone: Option<&str>,
    ) -> SessionResult<JoinOutcome> {
        let code = normalize_session_code(code);

        let txn = self.storage.begin_write()?;
        let session_id = self
            .storage
            .find_session_by_code_txn(&txn, &code)?
            .ok_or_else(|| SessionError::SessionCodeNotFound(code.clone()))?;
        let mut session = self.load_session_txn(&txn, &session_id)?;
        if session.status.is_terminal() {
            return Err(SessionError::SessionCodeNotFound(code));
        }
        let table = self
            .storage
            .get_table_txn(&txn, session.table_id)?
            .ok_or_else(|| SessionError::TableNotFound(session.table_id.to_string()))?;

        let (guest, guest_token) =
            self.admit_txn(&txn, &mut session, guest_name, phone, now_millis())?;
        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        self.publish(&session, SessionEventKind::GuestJoined);
        Ok(JoinOutcome {
            session,
            table,
            guest,
            guest_token,
            created: false,
        })
    }

    fn resolve_table_txn(
        &self,
        txn: &WriteTransaction,
        target: JoinTarget<'_>,
    ) -> SessionResult<DiningTable> {
        let (table_id, label) = match target {
            JoinTarget::QrCode(code) => (
                self.storage
                    .find_table_by_qr_txn(txn, code)?
                    .ok_or_else(|| SessionError::TableNotFound(code.to_string()))?,
                code.to_string(),
            ),
            JoinTarget::TableId(id) => (id, id.to_string()),
        };
        let table = self
            .storage
            .get_table_txn(txn, table_id)?
            .ok_or(SessionError::TableNotFound(label))?;
        if !table.is_active {
            return Err(SessionError::TableDisabled(table.table_number));
        }
        Ok(table)
    }

    fn unique_session_code(&self, txn: &WriteTransaction) -> SessionResult<String> {
        for _ in 0..SESSION_CODE_ATTEMPTS {
            let code = generate_session_code();
            if self.storage.find_session_by_code_txn(txn, &code)?.is_none() {
                return Ok(code);
            }
        }
        Err(SessionError::Internal(
            "Failed to generate a unique session code".to_string(),
        ))
    }

    // ========== Waiter ==========

    /// Signal the waiter; repeated calls while unacknowledged change nothing
    pub fn call_waiter(&self, session_id: &str, token: &str) -> SessionResult<DiningSession> {
        let txn = self.storage.begin_write()?;
        let (mut session, guest_id) = self.authorize_txn(&txn, session_id, token)?;
        if session.status != SessionStatus::Active {
            return Err(SessionError::SessionClosed(session.status));
        }
        if session.waiter_called {
            return Ok(session);
        }

        let now = now_millis();
        session.waiter_called = true;
        session.waiter_call_time = Some(now);
        session.waiter_response_time = None;
        super::membership::touch_guest(&mut session, &guest_id, now);
        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        tracing::info!(session_id, table_number = %session.table_number, "Waiter called");
        self.publish(&session, SessionEventKind::WaiterCalled);
        Ok(session)
    }

    /// Staff: clear the waiter flag and record the response time
    pub fn acknowledge_waiter(
        &self,
        scope: AccessScope,
        session_id: &str,
    ) -> SessionResult<DiningSession> {
        let txn = self.storage.begin_write()?;
        let mut session = self.load_session_txn(&txn, session_id)?;
        scope.check(session.restaurant_id)?;
        if !session.waiter_called {
            return Ok(session);
        }

        let now = now_millis();
        session.waiter_called = false;
        session.waiter_response_time = Some(now);
        session.updated_at = now;
        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        self.publish(&session, SessionEventKind::WaiterAcknowledged);
        Ok(session)
    }

    // ========== State machine ==========

    /// ACTIVE → AWAITING_PAYMENT
    pub fn request_bill(&self, session_id: &str, token: &str) -> SessionResult<DiningSession> {
        let txn = self.storage.begin_write()?;
        let mut session = self.load_session_txn(&txn, session_id)?;
        let target = SessionStatus::AwaitingPayment;
        if !session.status.can_transition_to(target) {
            return Err(SessionError::InvalidTransition {
                from: session.status,
                to: target,
            });
        }
        let (_, guest_id) = self.authorize_txn(&txn, session_id, token)?;

        let now = now_millis();
        session.status = target;
        super::membership::touch_guest(&mut session, &guest_id, now);
        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        tracing::info!(session_id, "Bill requested");
        self.publish(&session, SessionEventKind::StatusChanged);
        Ok(session)
    }

    /// Staff: ACTIVE | AWAITING_PAYMENT → COMPLETED
    ///
    /// Marks the payment PAID, releases the session code and clears the table
    /// pointer in one transaction. Ending a completed session is a no-op.
    pub fn end_session(&self, scope: AccessScope, session_id: &str) -> SessionResult<DiningSession> {
        self.close_session(scope, session_id, SessionStatus::Completed)
    }

    /// Staff: ACTIVE | PAUSED → CANCELLED (payment VOID)
    pub fn cancel_session(
        &self,
        scope: AccessScope,
        session_id: &str,
    ) -> SessionResult<DiningSession> {
        self.close_session(scope, session_id, SessionStatus::Cancelled)
    }

    /// Staff: ACTIVE → PAUSED (the table stays occupied)
    pub fn pause_session(&self, scope: AccessScope, session_id: &str) -> SessionResult<DiningSession> {
        self.transition(scope, session_id, SessionStatus::Paused)
    }

    /// Staff: PAUSED → ACTIVE
    pub fn resume_session(
        &self,
        scope: AccessScope,
        session_id: &str,
    ) -> SessionResult<DiningSession> {
        self.transition(scope, session_id, SessionStatus::Active)
    }

    fn transition(
        &self,
        scope: AccessScope,
        session_id: &str,
        target: SessionStatus,
    ) -> SessionResult<DiningSession> {
        let txn = self.storage.begin_write()?;
        let mut session = self.load_session_txn(&txn, session_id)?;
        scope.check(session.restaurant_id)?;
        if !session.status.can_transition_to(target) {
            return Err(SessionError::InvalidTransition {
                from: session.status,
                to: target,
            });
        }

        let from = session.status;
        session.status = target;
        session.touch(now_millis());
        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        tracing::info!(session_id, from = %from, to = %target, "Session status changed");
        self.publish(&session, SessionEventKind::StatusChanged);
        Ok(session)
    }

    fn close_session(
        &self,
        scope: AccessScope,
        session_id: &str,
        target: SessionStatus,
    ) -> SessionResult<DiningSession> {
        let txn = self.storage.begin_write()?;
        let mut session = self.load_session_txn(&txn, session_id)?;
        scope.check(session.restaurant_id)?;
        if session.status == target {
            return Ok(session);
        }
        if !session.status.can_transition_to(target) {
            return Err(SessionError::InvalidTransition {
                from: session.status,
                to: target,
            });
        }

        let from = session.status;
        self.close_txn(&txn, &mut session, target, now_millis())?;
        Self::commit(txn)?;

        tracing::info!(session_id, from = %from, to = %target, "Session closed");
        self.publish(&session, SessionEventKind::StatusChanged);
        Ok(session)
    }

    /// Move a session into a terminal status and release what it holds
    fn close_txn(
        &self,
        txn: &WriteTransaction,
        session: &mut DiningSession,
        target: SessionStatus,
        now: i64,
    ) -> SessionResult<()> {
        session.status = target;
        session.payment_status = match target {
            SessionStatus::Completed => PaymentStatus::Paid,
            _ => PaymentStatus::Void,
        };
        session.ended_at = Some(now);
        session.waiter_called = false;
        session.updated_at = now;

        self.storage.remove_session_code(txn, &session.session_code)?;
        if let Some(mut table) = self.storage.get_table_txn(txn, session.table_id)?
            && table.current_session_id.as_deref() == Some(session.id.as_str())
        {
            table.current_session_id = None;
            table.updated_at = now;
            self.storage.put_table(txn, &table)?;
        }
        self.storage.put_session(txn, session)?;
        Ok(())
    }

    // ========== Sweeper ==========

    /// One sweeper pass
    ///
    /// - cancels ACTIVE/PAUSED sessions idle for longer than `idle_timeout_ms`
    ///   that have no orders (sessions with orders are left for staff)
    /// - clears table pointers to missing or ended sessions
    /// - drops guest tokens of ended sessions
    pub fn sweep(&self, now: i64, idle_timeout_ms: i64) -> SessionResult<SweepReport> {
        let mut report = SweepReport::default();
        let mut closed = Vec::new();

        let txn = self.storage.begin_write()?;
        for session_id in self.storage.live_session_ids_txn(&txn)? {
            let Some(mut session) = self.storage.get_session_txn(&txn, &session_id)? else {
                continue;
            };
            let idle = now - session.last_activity_at > idle_timeout_ms;
            let cancellable = matches!(
                session.status,
                SessionStatus::Active | SessionStatus::Paused
            );
            if idle && cancellable && session.orders.is_empty() {
                self.close_txn(&txn, &mut session, SessionStatus::Cancelled, now)?;
                report.cancelled.push(session.id.clone());
                closed.push(session);
            }
        }

        for mut table in self.storage.occupied_tables_txn(&txn)? {
            let Some(session_id) = table.current_session_id.clone() else {
                continue;
            };
            let dangling = match self.storage.get_session_txn(&txn, &session_id)? {
                Some(s) => s.status.is_terminal() || s.table_id != table.id,
                None => true,
            };
            if dangling {
                table.current_session_id = None;
                table.updated_at = now;
                self.storage.put_table(&txn, &table)?;
                report.reconciled_tables.push(table.id);
            }
        }

        report.purged_tokens = self.storage.purge_guest_tokens_txn(&txn, |entry| {
            Ok(match self.storage.get_session_txn(&txn, &entry.session_id)? {
                Some(s) => s.status.is_terminal(),
                None => true,
            })
        })?;

        Self::commit(txn)?;

        for session in &closed {
            tracing::info!(session_id = %session.id, "Idle session cancelled by sweeper");
            self.publish(session, SessionEventKind::StatusChanged);
        }
        Ok(report)
    }
}
