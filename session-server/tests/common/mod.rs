//! 集成测试公共设施: 临时目录 + 完整初始化的 ServerState

#![allow(dead_code)]

use rust_decimal::Decimal;
use session_client::{GuestClient, OneshotTransport, StaffClient};
use session_server::{Config, ServerState, build_app};
use shared::models::{DiningTableCreate, MenuItemCreate, RestaurantCreate};
use tempfile::TempDir;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password-1";
pub const MANAGER_PASSWORD: &str = "manager-password-1";

pub struct TestServer {
    pub state: ServerState,
    pub transport: OneshotTransport,
    // Keeps the redb file alive for the test
    _dir: TempDir,
}

impl TestServer {
    pub fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
        config.bootstrap_admin_username = Some(ADMIN_USERNAME.to_string());
        config.bootstrap_admin_password = Some(ADMIN_PASSWORD.to_string());

        let state = ServerState::initialize(&config).unwrap();
        let router = build_app(&state).with_state(state.clone());
        Self {
            state,
            transport: OneshotTransport::new(router),
            _dir: dir,
        }
    }

    pub fn staff(&self) -> StaffClient<OneshotTransport> {
        StaffClient::new(self.transport.clone())
    }

    pub fn guest(&self) -> GuestClient<OneshotTransport> {
        GuestClient::new(self.transport.clone())
    }

    pub async fn admin(&self) -> StaffClient<OneshotTransport> {
        let client = self.staff();
        client.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
        client
    }
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn restaurant_req(name: &str, manager: &str, tax_rate: &str) -> RestaurantCreate {
    RestaurantCreate {
        name: name.to_string(),
        tax_rate: Some(dec(tax_rate)),
        service_charge_rate: Some(Decimal::ZERO),
        currency: None,
        manager_username: manager.to_string(),
        manager_password: MANAGER_PASSWORD.to_string(),
    }
}

pub fn table_req(number: &str) -> DiningTableCreate {
    DiningTableCreate {
        restaurant_id: None,
        table_number: number.to_string(),
        capacity: 4,
        location: None,
    }
}

pub fn menu_req(name: &str, price: &str) -> MenuItemCreate {
    MenuItemCreate {
        restaurant_id: None,
        category_id: None,
        name: name.to_string(),
        description: None,
        price: dec(price),
        is_available: None,
        variations: Vec::new(),
    }
}
