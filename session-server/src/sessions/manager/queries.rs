//! Read models for staff and guests

use super::{AccessScope, SessionManager};
use crate::sessions::error::SessionResult;
use crate::sessions::money::{round_money, split_bill};
use rust_decimal::Decimal;
use shared::dto::{BillSplit, Page, PageQuery, SessionDetails, SessionHistoryEntry};
use shared::models::DiningSession;
use shared::util::now_millis;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

const MILLIS_PER_MINUTE: i64 = 60_000;

fn history_entry(session: &DiningSession, now: i64) -> SessionHistoryEntry {
    let end = session.ended_at.unwrap_or(now);
    let total_orders = session.billable_orders().count();
    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        round_money(session.totals.total / Decimal::from(total_orders))
    };

    SessionHistoryEntry {
        session_id: session.id.clone(),
        session_code: session.session_code.clone(),
        status: session.status,
        table_number: session.table_number.clone(),
        guest_count: session.guests.len(),
        host_name: session.host_name.clone(),
        host_phone: session.host_phone.clone(),
        totals: session.totals.clone(),
        payment_status: session.payment_status,
        started_at: session.started_at,
        ended_at: session.ended_at,
        duration_minutes: (end - session.started_at).max(0) / MILLIS_PER_MINUTE,
        total_orders,
        average_order_value,
        created_at: session.created_at,
        updated_at: session.updated_at,
    }
}

/// Newest first, ties broken by id for a stable order
fn sort_newest_first(sessions: &mut [DiningSession]) {
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

impl SessionManager {
    /// Live sessions of a restaurant, newest first
    pub fn active_sessions(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
    ) -> SessionResult<Vec<SessionDetails>> {
        scope.check(restaurant_id)?;
        let mut sessions: Vec<DiningSession> = self
            .storage
            .list_sessions(restaurant_id)?
            .into_iter()
            .filter(|s| !s.status.is_terminal())
            .collect();
        sort_newest_first(&mut sessions);
        Ok(sessions.into_iter().map(SessionDetails::from).collect())
    }

    /// All sessions of a restaurant, newest first, paged from 0
    pub fn session_history(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
        query: PageQuery,
    ) -> SessionResult<Page<SessionHistoryEntry>> {
        scope.check(restaurant_id)?;
        let page = query.page.unwrap_or(0);
        let size = query
            .size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let mut sessions = self.storage.list_sessions(restaurant_id)?;
        sort_newest_first(&mut sessions);

        let total = sessions.len() as u64;
        let total_pages = total.div_ceil(u64::from(size)) as u32;
        let now = now_millis();
        let items = sessions
            .iter()
            .skip(page as usize * size as usize)
            .take(size as usize)
            .map(|s| history_entry(s, now))
            .collect();

        Ok(Page {
            items,
            page,
            size,
            total,
            total_pages,
        })
    }

    pub fn session_details(
        &self,
        scope: AccessScope,
        session_id: &str,
    ) -> SessionResult<SessionDetails> {
        let session = self.load_session(session_id)?;
        scope.check(session.restaurant_id)?;
        Ok(SessionDetails::from(session))
    }

    /// Session view for a present guest of a live session
    pub fn guest_view(&self, session_id: &str, token: &str) -> SessionResult<SessionDetails> {
        self.validate_for_session(session_id, token)?;
        Ok(SessionDetails::from(self.load_session(session_id)?))
    }

    /// Per-guest bill shares
    pub fn bill_split(&self, session_id: &str, token: &str) -> SessionResult<BillSplit> {
        self.validate_for_session(session_id, token)?;
        let session = self.load_session(session_id)?;
        let restaurant = self.load_restaurant(session.restaurant_id)?;
        Ok(split_bill(&session, &restaurant.currency))
    }
}
