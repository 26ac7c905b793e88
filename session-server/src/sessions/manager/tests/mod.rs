use super::*;
use rust_decimal::Decimal;
use shared::dto::AddCartItemRequest;
use shared::models::{
    CartItem, DiningTable, DiningTableCreate, MenuItem, MenuItemCreate, MenuItemVariationCreate,
    RestaurantCreate, SessionStatus,
};

fn create_test_manager() -> SessionManager {
    let storage = SessionStorage::open_in_memory().unwrap();
    SessionManager::with_storage(storage)
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// A restaurant (tax 8%, no service charge) with two tables and a small menu
struct Fixture {
    manager: SessionManager,
    restaurant_id: i64,
    table: DiningTable,
    other_table: DiningTable,
    /// 8.99, variation "Double" +3.00
    burger: MenuItem,
    /// 2.50
    soda: MenuItem,
}

impl Fixture {
    fn new() -> Self {
        Self::with_manager(create_test_manager())
    }

    fn with_manager(manager: SessionManager) -> Self {
        let restaurant_id = seed_restaurant(&manager, "Bistro", "mgr", "0.08", "0");
        let table = seed_table(&manager, restaurant_id, "T1");
        let other_table = seed_table(&manager, restaurant_id, "T2");
        let burger = seed_menu_item(&manager, restaurant_id, "Burger", "8.99", &[("Double", "3.00")]);
        let soda = seed_menu_item(&manager, restaurant_id, "Soda", "2.50", &[]);
        Self {
            manager,
            restaurant_id,
            table,
            other_table,
            burger,
            soda,
        }
    }

    /// Open a session on `table` with a host; returns (outcome, host token)
    fn open(&self, host: &str) -> (JoinOutcome, String) {
        let outcome = self
            .manager
            .create_or_join(JoinTarget::QrCode(&self.table.qr_code), host, None, None, None)
            .unwrap();
        let token = outcome.guest_token.clone();
        (outcome, token)
    }

    /// Join the session by its code; returns the guest token
    fn join(&self, code: &str, name: &str) -> String {
        self.manager
            .join_by_code(code, name, None)
            .unwrap()
            .guest_token
    }

    fn add(&self, session_id: &str, token: &str, item: &MenuItem, quantity: i32) -> CartItem {
        self.manager
            .add_to_cart(session_id, token, &cart_req(item.id, quantity))
            .unwrap()
    }

    fn session(&self, session_id: &str) -> DiningSession {
        self.manager.load_session(session_id).unwrap()
    }

    fn table(&self, table_id: i64) -> DiningTable {
        self.manager.storage().get_table(table_id).unwrap().unwrap()
    }
}

fn seed_restaurant(
    manager: &SessionManager,
    name: &str,
    manager_username: &str,
    tax_rate: &str,
    service_charge_rate: &str,
) -> i64 {
    let req = RestaurantCreate {
        name: name.to_string(),
        tax_rate: Some(dec(tax_rate)),
        service_charge_rate: Some(dec(service_charge_rate)),
        currency: None,
        manager_username: manager_username.to_string(),
        manager_password: "not-used-here".to_string(),
    };
    let (restaurant, _) = manager.create_restaurant(&req, "$argon2id$test").unwrap();
    restaurant.id
}

fn seed_table(manager: &SessionManager, restaurant_id: i64, number: &str) -> DiningTable {
    let req = DiningTableCreate {
        restaurant_id: None,
        table_number: number.to_string(),
        capacity: 4,
        location: None,
    };
    manager
        .create_table(AccessScope::All, restaurant_id, &req)
        .unwrap()
}

fn seed_menu_item(
    manager: &SessionManager,
    restaurant_id: i64,
    name: &str,
    price: &str,
    variations: &[(&str, &str)],
) -> MenuItem {
    let req = MenuItemCreate {
        restaurant_id: None,
        category_id: None,
        name: name.to_string(),
        description: None,
        price: dec(price),
        is_available: None,
        variations: variations
            .iter()
            .map(|(n, adj)| MenuItemVariationCreate {
                name: n.to_string(),
                price_adjustment: dec(adj),
            })
            .collect(),
    };
    manager
        .create_menu_item(AccessScope::All, restaurant_id, &req)
        .unwrap()
}

fn cart_req(menu_item_id: i64, quantity: i32) -> AddCartItemRequest {
    AddCartItemRequest {
        menu_item_id,
        variation_id: None,
        quantity,
        special_instructions: None,
    }
}

/// Totals must always match the billable order lines
fn assert_totals_consistent(session: &DiningSession) {
    let expected: Decimal = session
        .billable_orders()
        .flat_map(|o| o.items.iter())
        .map(|i| i.unit_price * Decimal::from(i.quantity))
        .sum();
    assert_eq!(session.totals.subtotal, expected);
}

fn assert_single_host(session: &DiningSession) {
    let hosts: Vec<_> = session.guests.iter().filter(|g| g.is_host).collect();
    assert_eq!(hosts.len(), 1, "exactly one host expected");
    assert_eq!(session.host_guest_id.as_deref(), Some(hosts[0].id.as_str()));
}

mod test_admin;
mod test_sweeper;
