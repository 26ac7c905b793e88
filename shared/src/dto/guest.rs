//! Guest surface payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::session::SessionSummary;
use crate::models::{CartItem, DiningTable, MenuItem, Order, SessionGuest};

/// `POST /guest/sessions/join`
///
/// Exactly one of `table_qr_code` / `session_code` must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    #[validate(length(min = 1, max = 128))]
    pub table_qr_code: Option<String>,
    #[validate(length(equal = 6))]
    pub session_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub guest_name: String,
    #[validate(length(max = 32))]
    pub guest_phone: Option<String>,
    /// Checked against the table's restaurant when present
    pub restaurant_id: Option<i64>,
    #[validate(length(max = 500))]
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    pub session_id: String,
    /// Shareable session code
    pub session_token: String,
    /// Raw guest token, returned only here
    pub guest_token: String,
    pub guest_id: String,
    pub guest_name: String,
    pub is_host: bool,
    pub session: SessionSummary,
    pub table: DiningTable,
    pub guests: Vec<SessionGuest>,
    pub cart_items: Vec<CartItem>,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub menu_item_id: i64,
    pub variation_id: Option<i64>,
    #[validate(range(min = 1, max = 99))]
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, max = 99))]
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
}

/// Which cart items a submission converts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitScope {
    /// The caller's own items
    #[default]
    Mine,
    /// Everyone's items (host only)
    All,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderRequest {
    #[serde(default)]
    pub scope: SubmitScope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTipRequest {
    pub amount: Decimal,
}

/// `GET /guest/tables/{qrCode}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestTableResponse {
    pub table: DiningTable,
    pub restaurant_name: String,
    pub active_session: Option<SessionSummary>,
}

/// `GET /guest/restaurants/{id}/menu`: orderable items grouped by category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestMenuResponse {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub currency: String,
    /// Active categories with at least one orderable item, by sort order
    pub categories: Vec<GuestMenuCategory>,
    /// Orderable items without a category
    pub uncategorized: Vec<MenuItem>,
}

impl GuestMenuResponse {
    /// Every listed item, categories first
    pub fn all_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .chain(self.uncategorized.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestMenuCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub items: Vec<MenuItem>,
}

/// Per-guest share of the bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestShare {
    pub guest_id: String,
    pub guest_name: String,
    pub is_host: bool,
    /// Σ line totals this guest contributed
    pub items_subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub tip: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSplit {
    pub session_id: String,
    pub currency: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_charge: Decimal,
    pub tip: Decimal,
    pub total: Decimal,
    /// Shares sum exactly to `total`
    pub shares: Vec<GuestShare>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_request_validation() {
        let req = JoinSessionRequest {
            table_qr_code: Some("qr".into()),
            guest_name: "Alice".into(),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        let req = JoinSessionRequest {
            session_code: Some("ABC".into()),
            guest_name: String::new(),
            ..Default::default()
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("guest_name"));
        assert!(fields.contains_key("session_code"));
    }

    #[test]
    fn test_cart_quantity_range() {
        let mut req = AddCartItemRequest {
            menu_item_id: 1,
            variation_id: None,
            quantity: 99,
            special_instructions: None,
        };
        assert!(req.validate().is_ok());
        req.quantity = 0;
        assert!(req.validate().is_err());
        req.quantity = 100;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_submit_scope_defaults_to_mine() {
        let req: SubmitOrderRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.scope, SubmitScope::Mine);
        let req: SubmitOrderRequest = serde_json::from_str(r#"{"scope":"all"}"#).unwrap();
        assert_eq!(req.scope, SubmitScope::All);
    }

    #[test]
    fn test_join_request_camel_case() {
        let req: JoinSessionRequest =
            serde_json::from_str(r#"{"tableQrCode":"q1","guestName":"Bob","restaurantId":3}"#)
                .unwrap();
        assert_eq!(req.table_qr_code.as_deref(), Some("q1"));
        assert_eq!(req.restaurant_id, Some(3));
    }
}
