//! Staff Account Model

use serde::{Deserialize, Serialize};

/// Staff role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    /// Platform administrator
    Admin,
    Manager,
    Staff,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Staff => "staff",
        }
    }
}

/// Staff login account
///
/// Never returned by the API; see [`crate::client::UserInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAccount {
    pub id: i64,
    pub username: String,
    /// argon2 PHC string
    pub password_hash: String,
    pub role: StaffRole,
    /// None for platform admins
    pub restaurant_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
}
