//! Dining Session Model
//!
//! A session is stored as one aggregate: the session record together with its
//! guests, pending cart items and submitted orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::Order;

/// Session lifecycle status
///
/// ```text
/// ACTIVE ⇄ PAUSED
/// ACTIVE → AWAITING_PAYMENT → COMPLETED
/// ACTIVE → COMPLETED
/// ACTIVE | PAUSED → CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Active,
    Paused,
    AwaitingPayment,
    Completed,
    Cancelled,
}

impl SessionStatus {
    /// COMPLETED and CANCELLED never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the lifecycle allows `self → next`
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Active, Paused)
                | (Paused, Active)
                | (Active, AwaitingPayment)
                | (Active, Completed)
                | (AwaitingPayment, Completed)
                | (Active, Cancelled)
                | (Paused, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::AwaitingPayment => "AWAITING_PAYMENT",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status recorded on the session (no card capture)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Void,
}

/// Aggregate money figures of a session
///
/// `tax` and `service_charge` are the presented (rounded) values; `total` is
/// rounded from the unrounded components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub tip: Decimal,
    pub total: Decimal,
}

/// Dining session aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningSession {
    pub id: String,
    /// 6-char shareable join code
    pub session_code: String,
    pub restaurant_id: i64,
    pub table_id: i64,
    pub table_number: String,
    pub status: SessionStatus,
    pub host_guest_id: Option<String>,
    pub host_name: Option<String>,
    pub host_phone: Option<String>,
    pub special_requests: Option<String>,
    pub totals: SessionTotals,
    /// Snapshotted from the restaurant at creation
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
    #[serde(default)]
    pub guests: Vec<SessionGuest>,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl DiningSession {
    pub fn guest(&self, guest_id: &str) -> Option<&SessionGuest> {
        self.guests.iter().find(|g| g.id == guest_id)
    }

    pub fn guest_mut(&mut self, guest_id: &str) -> Option<&mut SessionGuest> {
        self.guests.iter_mut().find(|g| g.id == guest_id)
    }

    /// Guests that have not left
    pub fn present_guests(&self) -> impl Iterator<Item = &SessionGuest> {
        self.guests.iter().filter(|g| g.left_at.is_none())
    }

    pub fn is_host(&self, guest_id: &str) -> bool {
        self.host_guest_id.as_deref() == Some(guest_id)
    }

    /// Orders that count toward the bill
    pub fn billable_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| !o.status.is_cancelled())
    }

    /// Refresh `last_activity_at` and `updated_at`
    pub fn touch(&mut self, now: i64) {
        self.last_activity_at = now;
        self.updated_at = now;
    }
}

/// One participant of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGuest {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub is_host: bool,
    pub joined_at: i64,
    pub last_activity_at: i64,
    pub left_at: Option<i64>,
}

/// Unsubmitted contribution of one guest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub guest_id: String,
    pub guest_name: String,
    pub menu_item_id: i64,
    pub variation_id: Option<i64>,
    pub name: String,
    pub variation_name: Option<String>,
    pub quantity: i32,
    /// Informational; the price is re-read from the menu on submit
    pub unit_price: Decimal,
    pub special_instructions: Option<String>,
    pub added_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use SessionStatus::*;
        assert!(Active.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Active));
        assert!(Active.can_transition_to(AwaitingPayment));
        assert!(AwaitingPayment.can_transition_to(Completed));
        assert!(Active.can_transition_to(Completed));
        assert!(Paused.can_transition_to(Cancelled));

        assert!(!Paused.can_transition_to(AwaitingPayment));
        assert!(!AwaitingPayment.can_transition_to(Cancelled));
        assert!(!AwaitingPayment.can_transition_to(Active));
    }

    #[test]
    fn test_terminal_states_are_final() {
        use SessionStatus::*;
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for to in [Active, Paused, AwaitingPayment, Completed, Cancelled] {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&SessionStatus::AwaitingPayment).unwrap();
        assert_eq!(json, "\"AWAITING_PAYMENT\"");
        let status: SessionStatus = serde_json::from_str("\"PAUSED\"").unwrap();
        assert_eq!(status, SessionStatus::Paused);
    }
}
