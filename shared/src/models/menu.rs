//! Menu Category and Menu Item Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Ascending display order on the guest menu
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategoryCreate {
    /// Defaults to the caller's restaurant
    pub restaurant_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategoryUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Menu item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    /// Uncategorized when `None`
    #[serde(default)]
    pub category_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_active: bool,
    /// Temporarily sold out when false
    pub is_available: bool,
    #[serde(default)]
    pub variations: Vec<MenuItemVariation>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MenuItem {
    /// Whether guests may order this item right now
    pub fn is_orderable(&self) -> bool {
        self.is_active && self.is_available
    }

    /// Active variation by id
    pub fn variation(&self, variation_id: i64) -> Option<&MenuItemVariation> {
        self.variations
            .iter()
            .find(|v| v.id == variation_id && v.is_active)
    }

    /// Unit price with an optional variation adjustment applied
    pub fn unit_price(&self, variation: Option<&MenuItemVariation>) -> Decimal {
        self.price + variation.map(|v| v.price_adjustment).unwrap_or_default()
    }
}

/// Menu item variation (size, spice level, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemVariation {
    pub id: i64,
    pub name: String,
    /// Added to the item price, may be negative
    pub price_adjustment: Decimal,
    pub is_active: bool,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    /// Defaults to the caller's restaurant
    pub restaurant_id: Option<i64>,
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub price: Decimal,
    pub is_available: Option<bool>,
    #[serde(default)]
    #[validate(nested)]
    pub variations: Vec<MenuItemVariationCreate>,
}

/// Create variation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemVariationCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub price_adjustment: Decimal,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    /// Moves the item to another category of the same restaurant
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub is_available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burger() -> MenuItem {
        MenuItem {
            id: 1,
            restaurant_id: 1,
            category_id: None,
            name: "Burger".into(),
            description: None,
            price: Decimal::new(899, 2),
            is_active: true,
            is_available: true,
            variations: vec![
                MenuItemVariation {
                    id: 10,
                    name: "Double".into(),
                    price_adjustment: Decimal::new(300, 2),
                    is_active: true,
                },
                MenuItemVariation {
                    id: 11,
                    name: "Kids".into(),
                    price_adjustment: Decimal::new(-200, 2),
                    is_active: false,
                },
            ],
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_unit_price_with_variation() {
        let item = burger();
        assert_eq!(item.unit_price(None), Decimal::new(899, 2));
        assert_eq!(item.unit_price(item.variation(10)), Decimal::new(1199, 2));
    }

    #[test]
    fn test_inactive_variation_hidden() {
        let item = burger();
        assert!(item.variation(11).is_none());
        assert!(item.variation(99).is_none());
    }

    #[test]
    fn test_orderable() {
        let mut item = burger();
        assert!(item.is_orderable());
        item.is_available = false;
        assert!(!item.is_orderable());
    }
}
