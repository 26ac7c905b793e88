//! Restaurant, staff account, menu category and menu administration

use super::{AccessScope, SessionManager, optional_text, require_text};
use crate::sessions::error::{SessionError, SessionResult};
use crate::sessions::money::{validate_price, validate_rate};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN};
use rust_decimal::Decimal;
use redb::WriteTransaction;
use shared::dto::{GuestMenuCategory, GuestMenuResponse};
use shared::models::{
    MenuCategory, MenuCategoryCreate, MenuCategoryUpdate, MenuItem, MenuItemCreate,
    MenuItemUpdate, MenuItemVariation, Restaurant, RestaurantCreate, RestaurantSettingsUpdate,
    StaffAccount, StaffRole,
};
use std::collections::HashMap;
use shared::util::now_millis;

const DEFAULT_CURRENCY: &str = "USD";

fn normalize_currency(currency: Option<&str>) -> SessionResult<String> {
    let code = currency.map(str::trim).unwrap_or(DEFAULT_CURRENCY);
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SessionError::Validation(format!(
            "currency must be a 3-letter ISO code, got {}",
            code
        )));
    }
    Ok(code.to_ascii_uppercase())
}

impl SessionManager {
    // ========== Restaurants ==========

    /// Create a restaurant together with its manager account
    pub fn create_restaurant(
        &self,
        req: &RestaurantCreate,
        manager_password_hash: &str,
    ) -> SessionResult<(Restaurant, StaffAccount)> {
        let name = require_text("name", &req.name, MAX_NAME_LEN)?;
        let username = require_text("managerUsername", &req.manager_username, MAX_NAME_LEN)?;
        let tax_rate = req.tax_rate.unwrap_or(Decimal::ZERO);
        let service_charge_rate = req.service_charge_rate.unwrap_or(Decimal::ZERO);
        validate_rate("taxRate", tax_rate)?;
        validate_rate("serviceChargeRate", service_charge_rate)?;
        let currency = normalize_currency(req.currency.as_deref())?;

        let txn = self.storage.begin_write()?;
        if self.storage.get_staff_txn(&txn, &username)?.is_some() {
            return Err(SessionError::UsernameExists(username));
        }

        let now = now_millis();
        let restaurant = Restaurant {
            id: self.storage.next_id(&txn)?,
            name,
            tax_rate,
            service_charge_rate,
            currency,
            is_active: true,
            created_at: now,
        };
        let manager = StaffAccount {
            id: self.storage.next_id(&txn)?,
            username,
            password_hash: manager_password_hash.to_string(),
            role: StaffRole::Manager,
            restaurant_id: Some(restaurant.id),
            is_active: true,
            created_at: now,
        };
        self.storage.put_restaurant(&txn, &restaurant)?;
        self.storage.put_staff(&txn, &manager)?;
        Self::commit(txn)?;

        tracing::info!(
            restaurant_id = restaurant.id,
            manager = %manager.username,
            "Restaurant created"
        );
        Ok((restaurant, manager))
    }

    pub fn get_restaurant(&self, scope: AccessScope, restaurant_id: i64) -> SessionResult<Restaurant> {
        scope.check(restaurant_id)?;
        self.load_restaurant(restaurant_id)
    }

    /// Update restaurant settings
    ///
    /// Live sessions keep the rates they were opened with.
    pub fn update_settings(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
        update: &RestaurantSettingsUpdate,
    ) -> SessionResult<Restaurant> {
        scope.check(restaurant_id)?;
        if let Some(rate) = update.tax_rate {
            validate_rate("taxRate", rate)?;
        }
        if let Some(rate) = update.service_charge_rate {
            validate_rate("serviceChargeRate", rate)?;
        }

        let txn = self.storage.begin_write()?;
        let mut restaurant = self.load_restaurant_txn(&txn, restaurant_id)?;
        if let Some(name) = &update.name {
            restaurant.name = require_text("name", name, MAX_NAME_LEN)?;
        }
        if let Some(rate) = update.tax_rate {
            restaurant.tax_rate = rate;
        }
        if let Some(rate) = update.service_charge_rate {
            restaurant.service_charge_rate = rate;
        }
        if update.currency.is_some() {
            restaurant.currency = normalize_currency(update.currency.as_deref())?;
        }
        if let Some(is_active) = update.is_active {
            restaurant.is_active = is_active;
        }
        self.storage.put_restaurant(&txn, &restaurant)?;
        Self::commit(txn)?;

        tracing::info!(restaurant_id, "Restaurant settings updated");
        Ok(restaurant)
    }

    // ========== Staff accounts ==========

    /// Create the platform admin if no staff account exists yet
    ///
    /// Returns whether an account was created.
    pub fn bootstrap_admin(&self, username: &str, password_hash: &str) -> SessionResult<bool> {
        let username = require_text("username", username, MAX_NAME_LEN)?;

        let txn = self.storage.begin_write()?;
        if self.storage.count_staff_txn(&txn)? > 0 {
            return Ok(false);
        }
        let account = StaffAccount {
            id: self.storage.next_id(&txn)?,
            username,
            password_hash: password_hash.to_string(),
            role: StaffRole::Admin,
            restaurant_id: None,
            is_active: true,
            created_at: now_millis(),
        };
        self.storage.put_staff(&txn, &account)?;
        Self::commit(txn)?;

        tracing::info!(username = %account.username, "Bootstrap admin account created");
        Ok(true)
    }

    pub fn find_staff(&self, username: &str) -> SessionResult<Option<StaffAccount>> {
        Ok(self.storage.get_staff(username)?)
    }

    // ========== Menu Categories ==========

    /// Categories of a restaurant ordered by sort order, then name
    pub fn list_categories(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
    ) -> SessionResult<Vec<MenuCategory>> {
        scope.check(restaurant_id)?;
        let mut categories = self.storage.list_categories(restaurant_id)?;
        sort_categories(&mut categories);
        Ok(categories)
    }

    pub fn create_category(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
        req: &MenuCategoryCreate,
    ) -> SessionResult<MenuCategory> {
        scope.check(restaurant_id)?;
        let name = require_text("name", &req.name, MAX_NAME_LEN)?;
        let description = optional_text("description", req.description.as_deref(), MAX_NOTE_LEN)?;

        let txn = self.storage.begin_write()?;
        self.load_restaurant_txn(&txn, restaurant_id)?;

        let now = now_millis();
        let category = MenuCategory {
            id: self.storage.next_id(&txn)?,
            restaurant_id,
            name,
            description,
            sort_order: req.sort_order.unwrap_or(0),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.storage.put_category(&txn, &category)?;
        Self::commit(txn)?;

        tracing::info!(category_id = category.id, restaurant_id, name = %category.name, "Menu category created");
        Ok(category)
    }

    /// Rename, reorder or deactivate a category
    ///
    /// Items of an inactive category are hidden from the guest menu.
    pub fn update_category(
        &self,
        scope: AccessScope,
        category_id: i64,
        req: &MenuCategoryUpdate,
    ) -> SessionResult<MenuCategory> {
        let txn = self.storage.begin_write()?;
        let mut category = self
            .storage
            .get_category_txn(&txn, category_id)?
            .ok_or(SessionError::CategoryNotFound(category_id))?;
        scope.check(category.restaurant_id)?;

        if let Some(name) = &req.name {
            category.name = require_text("name", name, MAX_NAME_LEN)?;
        }
        if req.description.is_some() {
            category.description =
                optional_text("description", req.description.as_deref(), MAX_NOTE_LEN)?;
        }
        if let Some(sort_order) = req.sort_order {
            category.sort_order = sort_order;
        }
        if let Some(is_active) = req.is_active {
            category.is_active = is_active;
        }
        category.updated_at = now_millis();

        self.storage.put_category(&txn, &category)?;
        Self::commit(txn)?;
        Ok(category)
    }

    /// Delete an empty category
    pub fn delete_category(&self, scope: AccessScope, category_id: i64) -> SessionResult<()> {
        let txn = self.storage.begin_write()?;
        let category = self
            .storage
            .get_category_txn(&txn, category_id)?
            .ok_or(SessionError::CategoryNotFound(category_id))?;
        scope.check(category.restaurant_id)?;

        let items = self.storage.category_items_txn(&txn, category_id)?;
        if !items.is_empty() {
            return Err(SessionError::CategoryHasItems(category_id, items.len()));
        }
        self.storage.remove_category(&txn, category_id)?;
        Self::commit(txn)?;

        tracing::info!(category_id, "Menu category deleted");
        Ok(())
    }

    /// The category must exist and belong to the item's restaurant
    fn check_category_txn(
        &self,
        txn: &WriteTransaction,
        restaurant_id: i64,
        category_id: i64,
    ) -> SessionResult<()> {
        match self.storage.get_category_txn(txn, category_id)? {
            Some(category) if category.restaurant_id == restaurant_id => Ok(()),
            _ => Err(SessionError::CategoryNotFound(category_id)),
        }
    }

    // ========== Menu ==========

    pub fn create_menu_item(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
        req: &MenuItemCreate,
    ) -> SessionResult<MenuItem> {
        scope.check(restaurant_id)?;
        let name = require_text("name", &req.name, MAX_NAME_LEN)?;
        let description = optional_text("description", req.description.as_deref(), MAX_NOTE_LEN)?;
        validate_price("price", req.price)?;
        for v in &req.variations {
            require_text("variation name", &v.name, MAX_NAME_LEN)?;
            validate_price(&format!("price of variation {}", v.name), req.price + v.price_adjustment)?;
        }

        let txn = self.storage.begin_write()?;
        self.load_restaurant_txn(&txn, restaurant_id)?;
        if let Some(category_id) = req.category_id {
            self.check_category_txn(&txn, restaurant_id, category_id)?;
        }

        let now = now_millis();
        let mut variations = Vec::with_capacity(req.variations.len());
        for v in &req.variations {
            variations.push(MenuItemVariation {
                id: self.storage.next_id(&txn)?,
                name: v.name.trim().to_string(),
                price_adjustment: v.price_adjustment,
                is_active: true,
            });
        }
        let item = MenuItem {
            id: self.storage.next_id(&txn)?,
            restaurant_id,
            category_id: req.category_id,
            name,
            description,
            price: req.price,
            is_active: true,
            is_available: req.is_available.unwrap_or(true),
            variations,
            created_at: now,
            updated_at: now,
        };
        self.storage.put_menu_item(&txn, &item)?;
        Self::commit(txn)?;

        tracing::info!(menu_item_id = item.id, restaurant_id, name = %item.name, "Menu item created");
        Ok(item)
    }

    /// Update a menu item
    ///
    /// Submitted orders keep their price snapshot; pending cart lines pick up
    /// the new price at submission.
    pub fn update_menu_item(
        &self,
        scope: AccessScope,
        menu_item_id: i64,
        req: &MenuItemUpdate,
    ) -> SessionResult<MenuItem> {
        let txn = self.storage.begin_write()?;
        let mut item = self
            .storage
            .get_menu_item_txn(&txn, menu_item_id)?
            .ok_or(SessionError::MenuItemNotFound(menu_item_id))?;
        scope.check(item.restaurant_id)?;

        if let Some(category_id) = req.category_id {
            self.check_category_txn(&txn, item.restaurant_id, category_id)?;
            item.category_id = Some(category_id);
        }
        if let Some(name) = &req.name {
            item.name = require_text("name", name, MAX_NAME_LEN)?;
        }
        if req.description.is_some() {
            item.description =
                optional_text("description", req.description.as_deref(), MAX_NOTE_LEN)?;
        }
        if let Some(price) = req.price {
            validate_price("price", price)?;
            for v in item.variations.iter().filter(|v| v.is_active) {
                validate_price(&format!("price of variation {}", v.name), price + v.price_adjustment)?;
            }
            item.price = price;
        }
        if let Some(is_active) = req.is_active {
            item.is_active = is_active;
        }
        if let Some(is_available) = req.is_available {
            item.is_available = is_available;
        }
        item.updated_at = now_millis();

        self.storage.put_menu_item(&txn, &item)?;
        Self::commit(txn)?;
        Ok(item)
    }

    /// Every menu item of a restaurant, including inactive ones
    pub fn list_menu_items(
        &self,
        scope: AccessScope,
        restaurant_id: i64,
    ) -> SessionResult<Vec<MenuItem>> {
        scope.check(restaurant_id)?;
        let mut items = self.storage.list_menu_items(restaurant_id)?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    /// Public menu: orderable items with their active variations, grouped
    /// by active category
    pub fn guest_menu(&self, restaurant_id: i64) -> SessionResult<GuestMenuResponse> {
        let restaurant = self.load_restaurant(restaurant_id)?;
        if !restaurant.is_active {
            return Err(SessionError::RestaurantInactive(restaurant_id));
        }

        let mut categories = self.storage.list_categories(restaurant_id)?;
        sort_categories(&mut categories);
        let active: HashMap<i64, bool> = categories.iter().map(|c| (c.id, c.is_active)).collect();

        let mut grouped: HashMap<i64, Vec<MenuItem>> = HashMap::new();
        let mut uncategorized = Vec::new();
        for mut item in self.storage.list_menu_items(restaurant_id)? {
            if !item.is_orderable() {
                continue;
            }
            item.variations.retain(|v| v.is_active);
            match item.category_id.and_then(|id| active.get(&id).map(|a| (id, *a))) {
                Some((id, true)) => grouped.entry(id).or_default().push(item),
                Some((_, false)) => {}
                None => uncategorized.push(item),
            }
        }
        uncategorized.sort_by(|a, b| a.name.cmp(&b.name));

        let categories = categories
            .into_iter()
            .filter_map(|c| {
                let mut items = grouped.remove(&c.id)?;
                items.sort_by(|a, b| a.name.cmp(&b.name));
                Some(GuestMenuCategory {
                    id: c.id,
                    name: c.name,
                    description: c.description,
                    sort_order: c.sort_order,
                    items,
                })
            })
            .collect();

        Ok(GuestMenuResponse {
            restaurant_id,
            restaurant_name: restaurant.name,
            currency: restaurant.currency,
            categories,
            uncategorized,
        })
    }
}

fn sort_categories(categories: &mut [MenuCategory]) {
    categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
}
