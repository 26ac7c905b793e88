//! Restaurant Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Restaurant tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    /// Fraction in `[0, 1]`, e.g. `0.08`
    pub tax_rate: Decimal,
    /// Fraction in `[0, 1]`
    pub service_charge_rate: Decimal,
    /// ISO 4217 code
    pub currency: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create restaurant payload (also provisions its manager account)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub tax_rate: Option<Decimal>,
    pub service_charge_rate: Option<Decimal>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    #[validate(length(min = 3, max = 64))]
    pub manager_username: String,
    #[validate(length(min = 8, max = 128))]
    pub manager_password: String,
}

/// Update restaurant settings payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSettingsUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub service_charge_rate: Option<Decimal>,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub is_active: Option<bool>,
}
