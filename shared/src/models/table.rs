//! Dining Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Physical table (QR code holder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i64,
    pub restaurant_id: i64,
    /// Unique within the restaurant
    pub table_number: String,
    pub capacity: i32,
    pub location: Option<String>,
    /// Opaque URL-safe token, globally unique
    pub qr_code: String,
    pub is_active: bool,
    /// Live session on this table, if any
    pub current_session_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    /// Defaults to the caller's restaurant
    pub restaurant_id: Option<i64>,
    #[validate(length(min = 1, max = 20))]
    pub table_number: String,
    #[validate(range(min = 1, max = 50))]
    pub capacity: i32,
    #[validate(length(max = 200))]
    pub location: Option<String>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    #[validate(range(min = 1, max = 50))]
    pub capacity: Option<i32>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    pub is_active: Option<bool>,
}
