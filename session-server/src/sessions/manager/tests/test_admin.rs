use super::*;
use shared::models::{
    DiningTableUpdate, MenuCategory, MenuCategoryCreate, MenuCategoryUpdate, MenuItemUpdate,
    RestaurantSettingsUpdate,
};

fn seed_category(fx: &Fixture, name: &str, sort_order: i32) -> MenuCategory {
    let req = MenuCategoryCreate {
        restaurant_id: None,
        name: name.to_string(),
        description: None,
        sort_order: Some(sort_order),
    };
    fx.manager
        .create_category(AccessScope::All, fx.restaurant_id, &req)
        .unwrap()
}

fn file_under(fx: &Fixture, item: &MenuItem, category: &MenuCategory) {
    let update = MenuItemUpdate {
        category_id: Some(category.id),
        ..Default::default()
    };
    fx.manager
        .update_menu_item(AccessScope::All, item.id, &update)
        .unwrap();
}

#[test]
fn test_duplicate_table_number_rejected() {
    let fx = Fixture::new();
    let req = DiningTableCreate {
        restaurant_id: None,
        table_number: " T1 ".to_string(),
        capacity: 2,
        location: None,
    };
    let err = fx
        .manager
        .create_table(AccessScope::All, fx.restaurant_id, &req)
        .unwrap_err();
    assert!(matches!(err, SessionError::TableNumberExists(n) if n == "T1"));
}

#[test]
fn test_tables_listed_by_number() {
    let fx = Fixture::new();
    seed_table(&fx.manager, fx.restaurant_id, "A0");

    let tables = fx
        .manager
        .list_tables(AccessScope::Restaurant(fx.restaurant_id), fx.restaurant_id)
        .unwrap();
    let numbers: Vec<_> = tables.iter().map(|t| t.table_number.as_str()).collect();
    assert_eq!(numbers, vec!["A0", "T1", "T2"]);

    let err = fx
        .manager
        .list_tables(AccessScope::Restaurant(fx.restaurant_id + 1000), fx.restaurant_id)
        .unwrap_err();
    assert!(matches!(err, SessionError::RestaurantMismatch));
}

#[test]
fn test_table_with_live_session_cannot_be_disabled() {
    let fx = Fixture::new();
    let (outcome, _) = fx.open("Alice");
    let disable = DiningTableUpdate {
        is_active: Some(false),
        ..Default::default()
    };

    let err = fx
        .manager
        .update_table(AccessScope::All, fx.table.id, &disable)
        .unwrap_err();
    assert!(matches!(err, SessionError::TableInUse(id) if id == outcome.session.id));

    fx.manager
        .end_session(AccessScope::All, &outcome.session.id)
        .unwrap();
    let table = fx
        .manager
        .update_table(AccessScope::All, fx.table.id, &disable)
        .unwrap();
    assert!(!table.is_active);
}

#[test]
fn test_update_table_capacity() {
    let fx = Fixture::new();
    let update = DiningTableUpdate {
        capacity: Some(8),
        location: Some("Patio".to_string()),
        ..Default::default()
    };
    let table = fx
        .manager
        .update_table(AccessScope::All, fx.other_table.id, &update)
        .unwrap();
    assert_eq!(table.capacity, 8);
    assert_eq!(table.location.as_deref(), Some("Patio"));
    assert_eq!(table.qr_code, fx.other_table.qr_code);
}

#[test]
fn test_regenerated_qr_code_replaces_old_one() {
    let fx = Fixture::new();
    let old = fx.table.qr_code.clone();

    let table = fx
        .manager
        .regenerate_qr_code(AccessScope::All, fx.table.id)
        .unwrap();
    assert_ne!(table.qr_code, old);

    let err = fx.manager.resolve_by_qr_code(&old).unwrap_err();
    assert!(matches!(err, SessionError::TableNotFound(_)));
    assert_eq!(
        fx.manager.resolve_by_qr_code(&table.qr_code).unwrap().id,
        fx.table.id
    );
}

#[test]
fn test_restaurant_manager_username_unique() {
    let fx = Fixture::new();
    let req = RestaurantCreate {
        name: "Second".to_string(),
        tax_rate: None,
        service_charge_rate: None,
        currency: None,
        manager_username: "mgr".to_string(),
        manager_password: "not-used-here".to_string(),
    };
    let err = fx
        .manager
        .create_restaurant(&req, "$argon2id$test")
        .unwrap_err();
    assert!(matches!(err, SessionError::UsernameExists(_)));
}

#[test]
fn test_settings_update_keeps_live_session_rates() {
    let fx = Fixture::new();
    let (outcome, alice) = fx.open("Alice");
    let sid = outcome.session.id.as_str();

    let update = RestaurantSettingsUpdate {
        tax_rate: Some(dec("0.20")),
        currency: Some("eur".to_string()),
        ..Default::default()
    };
    let restaurant = fx
        .manager
        .update_settings(AccessScope::Restaurant(fx.restaurant_id), fx.restaurant_id, &update)
        .unwrap();
    assert_eq!(restaurant.tax_rate, dec("0.20"));
    assert_eq!(restaurant.currency, "EUR");

    fx.add(sid, &alice, &fx.burger, 2);
    fx.manager.submit_order(sid, &alice, shared::dto::SubmitScope::Mine).unwrap();
    assert_eq!(fx.session(sid).totals.tax, dec("1.44"));
}

#[test]
fn test_invalid_rate_rejected() {
    let fx = Fixture::new();
    let update = RestaurantSettingsUpdate {
        tax_rate: Some(dec("1.5")),
        ..Default::default()
    };
    let err = fx
        .manager
        .update_settings(AccessScope::All, fx.restaurant_id, &update)
        .unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
}

#[test]
fn test_menu_item_update() {
    let fx = Fixture::new();
    let update = MenuItemUpdate {
        price: Some(dec("9.49")),
        is_available: Some(false),
        ..Default::default()
    };
    let item = fx
        .manager
        .update_menu_item(AccessScope::All, fx.burger.id, &update)
        .unwrap();
    assert_eq!(item.price, dec("9.49"));
    assert!(!item.is_available);

    let menu = fx
        .manager
        .list_menu_items(AccessScope::All, fx.restaurant_id)
        .unwrap();
    let names: Vec<_> = menu.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Burger", "Soda"]);
}

#[test]
fn test_negative_variation_price_rejected() {
    let fx = Fixture::new();
    let req = MenuItemCreate {
        restaurant_id: None,
        category_id: None,
        name: "Side".to_string(),
        description: None,
        price: dec("1.00"),
        is_available: None,
        variations: vec![MenuItemVariationCreate {
            name: "Small".to_string(),
            price_adjustment: dec("-2.00"),
        }],
    };
    let err = fx
        .manager
        .create_menu_item(AccessScope::All, fx.restaurant_id, &req)
        .unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
}

// ========================================================================
// Menu categories
// ========================================================================

#[test]
fn test_guest_menu_grouped_by_category_order() {
    let fx = Fixture::new();
    let drinks = seed_category(&fx, "Drinks", 2);
    let mains = seed_category(&fx, "Mains", 1);
    seed_category(&fx, "Desserts", 3);
    file_under(&fx, &fx.burger, &mains);
    file_under(&fx, &fx.soda, &drinks);
    let fries = seed_menu_item(&fx.manager, fx.restaurant_id, "Fries", "3.00", &[]);

    let menu = fx.manager.guest_menu(fx.restaurant_id).unwrap();
    let names: Vec<_> = menu.categories.iter().map(|c| c.name.as_str()).collect();
    // Empty categories are left out
    assert_eq!(names, vec!["Mains", "Drinks"]);
    assert_eq!(menu.categories[0].items[0].id, fx.burger.id);
    assert_eq!(menu.categories[1].items[0].id, fx.soda.id);
    assert_eq!(menu.uncategorized.len(), 1);
    assert_eq!(menu.uncategorized[0].id, fries.id);
    assert_eq!(menu.all_items().count(), 3);
}

#[test]
fn test_inactive_category_hides_its_items() {
    let fx = Fixture::new();
    let drinks = seed_category(&fx, "Drinks", 0);
    file_under(&fx, &fx.soda, &drinks);

    let update = MenuCategoryUpdate {
        is_active: Some(false),
        ..Default::default()
    };
    fx.manager
        .update_category(AccessScope::All, drinks.id, &update)
        .unwrap();

    let menu = fx.manager.guest_menu(fx.restaurant_id).unwrap();
    assert!(menu.categories.is_empty());
    let ids: Vec<_> = menu.all_items().map(|i| i.id).collect();
    assert_eq!(ids, vec![fx.burger.id]);
}

#[test]
fn test_item_category_must_belong_to_restaurant() {
    let fx = Fixture::new();
    let other = seed_restaurant(&fx.manager, "Other", "mgr2", "0", "0");
    let foreign = fx
        .manager
        .create_category(
            AccessScope::All,
            other,
            &MenuCategoryCreate {
                restaurant_id: None,
                name: "Foreign".to_string(),
                description: None,
                sort_order: None,
            },
        )
        .unwrap();

    let update = MenuItemUpdate {
        category_id: Some(foreign.id),
        ..Default::default()
    };
    let err = fx
        .manager
        .update_menu_item(AccessScope::All, fx.burger.id, &update)
        .unwrap_err();
    assert!(matches!(err, SessionError::CategoryNotFound(id) if id == foreign.id));
}

#[test]
fn test_category_with_items_cannot_be_deleted() {
    let fx = Fixture::new();
    let mains = seed_category(&fx, "Mains", 0);
    file_under(&fx, &fx.burger, &mains);

    let err = fx
        .manager
        .delete_category(AccessScope::All, mains.id)
        .unwrap_err();
    assert!(matches!(err, SessionError::CategoryHasItems(_, 1)));

    let empty = seed_category(&fx, "Specials", 5);
    fx.manager
        .delete_category(AccessScope::Restaurant(fx.restaurant_id), empty.id)
        .unwrap();
    let left: Vec<_> = fx
        .manager
        .list_categories(AccessScope::All, fx.restaurant_id)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(left, vec!["Mains"]);
}
