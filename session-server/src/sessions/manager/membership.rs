//! Guest membership: admission, token validation, leave

use super::{SessionManager, optional_text, require_text};
use crate::sessions::error::{SessionError, SessionResult};
use crate::sessions::storage::GuestTokenEntry;
use crate::sessions::tokens::{generate_guest_token, hash_guest_token};
use crate::utils::validation::{MAX_GUEST_NAME_LEN, MAX_PHONE_LEN};
use redb::WriteTransaction;
use shared::dto::SessionEventKind;
use shared::models::{DiningSession, SessionGuest, SessionStatus};
use shared::util::now_millis;

/// Guest resolved from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestContext {
    pub session_id: String,
    pub guest_id: String,
    pub guest_name: String,
    pub is_host: bool,
}

impl SessionManager {
    /// Admit a guest into a live session
    ///
    /// The first guest ever admitted becomes the host. Returns the guest and
    /// the raw token, which is not stored anywhere.
    pub fn admit(
        &self,
        session_id: &str,
        guest_name: &str,
        phone: Option<&str>,
    ) -> SessionResult<(SessionGuest, String)> {
        let txn = self.storage.begin_write()?;
        let mut session = self.load_session_txn(&txn, session_id)?;
        let admitted = self.admit_txn(&txn, &mut session, guest_name, phone, now_millis())?;
        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        self.publish(&session, SessionEventKind::GuestJoined);
        Ok(admitted)
    }

    /// Admission inside an open write transaction
    ///
    /// The host decision reads `session.guests` from the same transaction, so
    /// two simultaneous admissions cannot both see an empty session.
    pub(super) fn admit_txn(
        &self,
        txn: &WriteTransaction,
        session: &mut DiningSession,
        guest_name: &str,
        phone: Option<&str>,
        now: i64,
    ) -> SessionResult<(SessionGuest, String)> {
        let name = require_text("guestName", guest_name, MAX_GUEST_NAME_LEN)?;
        let phone = optional_text("guestPhone", phone, MAX_PHONE_LEN)?;

        if session.status != SessionStatus::Active {
            return Err(SessionError::SessionClosed(session.status));
        }
        // Guests who left keep their seat in the count
        if session.guests.len() >= self.max_guests {
            return Err(SessionError::GuestLimitReached(self.max_guests));
        }

        let is_host = session.guests.is_empty();
        let guest = SessionGuest {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            phone,
            is_host,
            joined_at: now,
            last_activity_at: now,
            left_at: None,
        };
        if is_host {
            session.host_guest_id = Some(guest.id.clone());
            session.host_name = Some(guest.name.clone());
            session.host_phone = guest.phone.clone();
        }

        let token = generate_guest_token()?;
        let entry = GuestTokenEntry {
            session_id: session.id.clone(),
            guest_id: guest.id.clone(),
        };
        self.storage
            .put_guest_token(txn, &hash_guest_token(&token), &entry)?;

        session.guests.push(guest.clone());
        session.touch(now);

        tracing::info!(
            session_id = %session.id,
            guest_id = %guest.id,
            is_host,
            "Guest admitted"
        );
        Ok((guest, token))
    }

    /// Resolve a guest token
    ///
    /// Fails for unknown tokens, guests who left and ended sessions.
    pub fn validate_token(&self, token: &str) -> SessionResult<GuestContext> {
        let entry = self
            .storage
            .find_guest_token(&hash_guest_token(token))?
            .ok_or(SessionError::GuestTokenInvalid)?;
        let session = self
            .storage
            .get_session(&entry.session_id)?
            .ok_or(SessionError::GuestTokenInvalid)?;
        if session.status.is_terminal() {
            return Err(SessionError::GuestTokenInvalid);
        }
        let guest = session
            .guest(&entry.guest_id)
            .filter(|g| g.left_at.is_none())
            .ok_or(SessionError::GuestTokenInvalid)?;

        Ok(GuestContext {
            session_id: session.id.clone(),
            guest_id: guest.id.clone(),
            guest_name: guest.name.clone(),
            is_host: guest.is_host,
        })
    }

    /// Resolve a token for `session_id` and check it still belongs to a present guest
    pub(super) fn validate_for_session(
        &self,
        session_id: &str,
        token: &str,
    ) -> SessionResult<GuestContext> {
        let ctx = self.validate_token(token)?;
        if ctx.session_id != session_id {
            return Err(SessionError::GuestTokenInvalid);
        }
        Ok(ctx)
    }

    /// Authorize a guest inside a write transaction
    ///
    /// Loads the session and returns the caller's guest id. The session status
    /// is left for the operation to judge.
    pub(super) fn authorize_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        token: &str,
    ) -> SessionResult<(DiningSession, String)> {
        let entry = self
            .storage
            .find_guest_token_txn(txn, &hash_guest_token(token))?
            .ok_or(SessionError::GuestTokenInvalid)?;
        if entry.session_id != session_id {
            return Err(SessionError::GuestTokenInvalid);
        }
        let session = self.load_session_txn(txn, session_id)?;
        match session.guest(&entry.guest_id) {
            Some(guest) if guest.left_at.is_none() => Ok((session, entry.guest_id)),
            _ => Err(SessionError::GuestTokenInvalid),
        }
    }

    /// Leave the session: the token is revoked, the guest record stays
    ///
    /// The host role is not transferred.
    pub fn leave(&self, session_id: &str, token: &str) -> SessionResult<DiningSession> {
        let txn = self.storage.begin_write()?;
        let (mut session, guest_id) = self.authorize_txn(&txn, session_id, token)?;
        if session.status.is_terminal() {
            return Err(SessionError::GuestTokenInvalid);
        }

        let now = now_millis();
        if let Some(guest) = session.guest_mut(&guest_id) {
            guest.left_at = Some(now);
            guest.last_activity_at = now;
        }
        session.touch(now);
        self.storage.remove_guest_token(&txn, &hash_guest_token(token))?;
        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        tracing::info!(session_id, guest_id = %guest_id, "Guest left");
        self.publish(&session, SessionEventKind::GuestLeft);
        Ok(session)
    }
}

/// Refresh a guest's activity timestamp
pub(super) fn touch_guest(session: &mut DiningSession, guest_id: &str, now: i64) {
    if let Some(guest) = session.guest_mut(guest_id) {
        guest.last_activity_at = now;
    }
    session.touch(now);
}
