//! Session views, staff queries and live events

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    CartItem, DiningSession, Order, OrderStatus, PaymentStatus, SessionGuest, SessionStatus,
    SessionTotals,
};

/// Session record without its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub session_code: String,
    pub restaurant_id: i64,
    pub table_id: i64,
    pub table_number: String,
    pub status: SessionStatus,
    /// Guests that have not left
    pub guest_count: usize,
    pub host_guest_id: Option<String>,
    pub host_name: Option<String>,
    pub host_phone: Option<String>,
    pub special_requests: Option<String>,
    pub totals: SessionTotals,
    pub tax_rate: Decimal,
    pub service_charge_rate: Decimal,
    pub payment_status: PaymentStatus,
    pub waiter_called: bool,
    pub waiter_call_time: Option<i64>,
    pub waiter_response_time: Option<i64>,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub last_activity_at: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&DiningSession> for SessionSummary {
    fn from(s: &DiningSession) -> Self {
        Self {
            id: s.id.clone(),
            session_code: s.session_code.clone(),
            restaurant_id: s.restaurant_id,
            table_id: s.table_id,
            table_number: s.table_number.clone(),
            status: s.status,
            guest_count: s.present_guests().count(),
            host_guest_id: s.host_guest_id.clone(),
            host_name: s.host_name.clone(),
            host_phone: s.host_phone.clone(),
            special_requests: s.special_requests.clone(),
            totals: s.totals.clone(),
            tax_rate: s.tax_rate,
            service_charge_rate: s.service_charge_rate,
            payment_status: s.payment_status,
            waiter_called: s.waiter_called,
            waiter_call_time: s.waiter_call_time,
            waiter_response_time: s.waiter_response_time,
            started_at: s.started_at,
            ended_at: s.ended_at,
            last_activity_at: s.last_activity_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Full session view (guest session view, staff details, active list)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetails {
    #[serde(flatten)]
    pub session: SessionSummary,
    pub guests: Vec<SessionGuest>,
    pub cart_items: Vec<CartItem>,
    pub orders: Vec<Order>,
}

impl From<DiningSession> for SessionDetails {
    fn from(s: DiningSession) -> Self {
        let session = SessionSummary::from(&s);
        Self {
            session,
            guests: s.guests,
            cart_items: s.cart_items,
            orders: s.orders,
        }
    }
}

/// One row of `GET /sessions/restaurant/{id}/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryEntry {
    pub session_id: String,
    pub session_code: String,
    pub status: SessionStatus,
    pub table_number: String,
    pub guest_count: usize,
    pub host_name: Option<String>,
    pub host_phone: Option<String>,
    pub totals: SessionTotals,
    pub payment_status: PaymentStatus,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    /// Until `ended_at`, or until now for live sessions
    pub duration_minutes: i64,
    /// Non-cancelled orders
    pub total_orders: usize,
    pub average_order_value: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Paging query (`page` from 0)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// What changed in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    Created,
    GuestJoined,
    GuestLeft,
    CartUpdated,
    OrderSubmitted,
    OrderStatusChanged,
    TipUpdated,
    WaiterCalled,
    WaiterAcknowledged,
    StatusChanged,
}

/// Broadcast after every committed session mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub session_id: String,
    pub restaurant_id: i64,
    pub kind: SessionEventKind,
    pub status: SessionStatus,
    /// Per-session monotonic counter
    pub version: u64,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_serialize() {
        let page = Page {
            items: vec![1, 2],
            page: 0,
            size: 2,
            total: 5,
            total_pages: 3,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["items"][1], 2);
    }

    #[test]
    fn test_event_kind_serialize() {
        let json = serde_json::to_string(&SessionEventKind::WaiterCalled).unwrap();
        assert_eq!(json, "\"waiter_called\"");
    }
}
