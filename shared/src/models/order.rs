//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kitchen status of a submitted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    fn rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Preparing => Some(2),
            Self::Ready => Some(3),
            Self::Served => Some(4),
            Self::Completed => Some(5),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Forward-only along the kitchen flow; cancel only before preparation starts
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            (Some(_), None) => matches!(self, Self::Pending | Self::Confirmed),
            (None, _) => false,
        }
    }
}

/// Immutable order converted from cart items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Submitting guest
    pub guest_id: String,
    pub guest_name: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line with menu snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub menu_item_id: i64,
    pub variation_id: Option<i64>,
    pub item_name: String,
    pub variation_name: Option<String>,
    /// Contributing guest (may differ from the submitter)
    pub guest_id: String,
    pub guest_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub special_instructions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only() {
        use OrderStatus::*;
        assert!(Pending.can_advance_to(Confirmed));
        assert!(Pending.can_advance_to(Ready));
        assert!(Served.can_advance_to(Completed));
        assert!(!Ready.can_advance_to(Preparing));
        assert!(!Completed.can_advance_to(Completed));
    }

    #[test]
    fn test_cancel_window() {
        use OrderStatus::*;
        assert!(Pending.can_advance_to(Cancelled));
        assert!(Confirmed.can_advance_to(Cancelled));
        assert!(!Preparing.can_advance_to(Cancelled));
        assert!(!Cancelled.can_advance_to(Pending));
        assert!(!Cancelled.can_advance_to(Cancelled));
    }
}
