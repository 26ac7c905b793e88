//! HTTP 端到端流程: 经 session-client 的 oneshot 传输调用完整应用

mod common;

use common::{MANAGER_PASSWORD, TestServer, dec, menu_req, restaurant_req, table_req};
use session_client::{ClientError, RawRequest, Transport};
use shared::ErrorCode;
use shared::dto::{AddCartItemRequest, PageQuery, SubmitScope};
use shared::models::{
    MenuCategoryCreate, MenuCategoryUpdate, OrderStatus, PaymentStatus, SessionStatus,
};

fn cart(menu_item_id: i64, quantity: i32) -> AddCartItemRequest {
    AddCartItemRequest {
        menu_item_id,
        variation_id: None,
        quantity,
        special_instructions: None,
    }
}

#[tokio::test]
async fn test_group_dining_flow() {
    let server = TestServer::start();
    let admin = server.admin().await;
    let restaurant = admin
        .create_restaurant(&restaurant_req("Bistro", "bistro-mgr", "0.08"))
        .await
        .unwrap();

    let manager = server.staff();
    let login = manager.login("bistro-mgr", MANAGER_PASSWORD).await.unwrap();
    assert_eq!(login.user.restaurant_id, Some(restaurant.id));

    let table = manager.create_table(&table_req("T1")).await.unwrap();
    let burger = manager
        .create_menu_item(&menu_req("Burger", "8.99"))
        .await
        .unwrap();

    // Alice scans the QR code and becomes host
    let alice = server.guest();
    let joined = alice.join_by_qr(&table.qr_code, "Alice").await.unwrap();
    assert!(joined.is_host);
    assert_eq!(joined.session.status, SessionStatus::Active);

    alice.add_to_cart(&cart(burger.id, 2)).await.unwrap();
    let order = alice.submit_order(SubmitScope::Mine).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let view = alice.get_session().await.unwrap();
    assert_eq!(view.session.totals.subtotal, dec("17.98"));
    assert_eq!(view.session.totals.tax, dec("1.44"));
    assert_eq!(view.session.totals.total, dec("19.42"));
    assert!(view.cart_items.is_empty());

    // Bob joins with the shared code
    let bob = server.guest();
    let bob_join = bob.join_by_code(&joined.session_token, "Bob").await.unwrap();
    assert!(!bob_join.is_host);
    assert_eq!(bob_join.session_id, joined.session_id);

    bob.add_to_cart(&cart(burger.id, 1)).await.unwrap();
    bob.submit_order(SubmitScope::Mine).await.unwrap();

    let view = bob.get_session().await.unwrap();
    assert_eq!(view.session.totals.subtotal, dec("26.97"));
    assert_eq!(view.orders.len(), 2);
    assert_eq!(view.session.guest_count, 2);

    // Staff side
    let active = manager.active_sessions(restaurant.id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].session.id, joined.session_id);

    manager
        .update_order_status(&joined.session_id, &order.id, OrderStatus::Confirmed)
        .await
        .unwrap();

    let summary = alice.request_bill().await.unwrap();
    assert_eq!(summary.status, SessionStatus::AwaitingPayment);

    let bill = bob.bill().await.unwrap();
    let share_sum: rust_decimal::Decimal = bill.shares.iter().map(|s| s.total).sum();
    assert_eq!(share_sum, bill.total);

    let ended = manager.end_session(&joined.session_id).await.unwrap();
    assert_eq!(ended.status, SessionStatus::Completed);
    assert_eq!(ended.payment_status, PaymentStatus::Paid);

    // Ending twice is a no-op
    let again = manager.end_session(&joined.session_id).await.unwrap();
    assert_eq!(again.status, SessionStatus::Completed);

    let table = manager.get_table(table.id).await.unwrap();
    assert!(table.current_session_id.is_none());

    // Guest tokens die with the session
    let err = alice.get_session().await.unwrap_err();
    assert_eq!(err.error_code(), Some(ErrorCode::GuestTokenInvalid));

    let history = manager
        .session_history(restaurant.id, PageQuery::default())
        .await
        .unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].total_orders, 2);
}

#[tokio::test]
async fn test_staff_routes_require_auth() {
    let server = TestServer::start();

    let resp = server
        .transport
        .send(RawRequest::get("/sessions/restaurant/1/active"))
        .await
        .unwrap();
    assert_eq!(resp.status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.into_error().error_code(),
        Some(ErrorCode::NotAuthenticated)
    );

    let client = server.staff();
    let err = client.login("admin", "wrong-password").await.unwrap_err();
    assert_eq!(err.error_code(), Some(ErrorCode::InvalidCredentials));
    assert!(matches!(client.me().await, Err(ClientError::Unauthorized)));
}

#[tokio::test]
async fn test_unknown_route_is_enveloped_404() {
    let server = TestServer::start();
    let resp = server
        .transport
        .send(RawRequest::get("/no/such/route"))
        .await
        .unwrap();
    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);

    let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
    assert_eq!(body["code"], ErrorCode::NotFound.code());
    assert_eq!(body["status"], 404);
    assert_eq!(body["path"], "/no/such/route");
}

#[tokio::test]
async fn test_manager_scoped_to_own_restaurant() {
    let server = TestServer::start();
    let admin = server.admin().await;
    let first = admin
        .create_restaurant(&restaurant_req("First", "first-mgr", "0"))
        .await
        .unwrap();
    let second = admin
        .create_restaurant(&restaurant_req("Second", "second-mgr", "0"))
        .await
        .unwrap();

    let manager = server.staff();
    manager.login("first-mgr", MANAGER_PASSWORD).await.unwrap();

    assert!(manager.active_sessions(first.id).await.unwrap().is_empty());
    let err = manager.active_sessions(second.id).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.error_code(), Some(ErrorCode::RestaurantMismatch));

    // Creating restaurants needs the platform-wide permission
    let err = manager
        .create_restaurant(&restaurant_req("Third", "third-mgr", "0"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), Some(ErrorCode::PermissionDenied));
}

#[tokio::test]
async fn test_guest_errors() {
    let server = TestServer::start();
    let admin = server.admin().await;
    admin
        .create_restaurant(&restaurant_req("Bistro", "bistro-mgr", "0.08"))
        .await
        .unwrap();
    let manager = server.staff();
    manager.login("bistro-mgr", MANAGER_PASSWORD).await.unwrap();
    let table = manager.create_table(&table_req("T1")).await.unwrap();

    let guest = server.guest();
    let err = guest.join_by_qr("no-such-code", "Alice").await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let joined = guest.join_by_qr(&table.qr_code, "Alice").await.unwrap();
    let err = guest.submit_order(SubmitScope::Mine).await.unwrap_err();
    assert_eq!(err.error_code(), Some(ErrorCode::EmptyCart));

    // Forged token
    let forged = session_client::GuestClient::with_token(
        server.transport.clone(),
        joined.session_id.clone(),
        "0".repeat(64),
    );
    let err = forged.get_session().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    // Table lookup shows the live session
    let view = guest.table(&table.qr_code).await.unwrap();
    assert_eq!(
        view.active_session.map(|s| s.id),
        Some(joined.session_id.clone())
    );
}

#[tokio::test]
async fn test_menu_categories() {
    let server = TestServer::start();
    let admin = server.admin().await;
    let restaurant = admin
        .create_restaurant(&restaurant_req("Bistro", "bistro-mgr", "0"))
        .await
        .unwrap();
    let manager = server.staff();
    manager.login("bistro-mgr", MANAGER_PASSWORD).await.unwrap();

    let category = |name: &str, sort_order: i32| MenuCategoryCreate {
        restaurant_id: None,
        name: name.to_string(),
        description: None,
        sort_order: Some(sort_order),
    };
    let drinks = manager.create_category(&category("Drinks", 2)).await.unwrap();
    let mains = manager.create_category(&category("Mains", 1)).await.unwrap();

    let mut burger = menu_req("Burger", "8.99");
    burger.category_id = Some(mains.id);
    manager.create_menu_item(&burger).await.unwrap();
    let mut soda = menu_req("Soda", "2.50");
    soda.category_id = Some(drinks.id);
    manager.create_menu_item(&soda).await.unwrap();

    let menu = server.guest().menu(restaurant.id).await.unwrap();
    let names: Vec<_> = menu.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Mains", "Drinks"]);

    // Moving drinks to the top reorders the guest menu
    let update = MenuCategoryUpdate {
        sort_order: Some(0),
        ..Default::default()
    };
    manager.update_category(drinks.id, &update).await.unwrap();
    let menu = server.guest().menu(restaurant.id).await.unwrap();
    assert_eq!(menu.categories[0].id, drinks.id);

    let err = manager.delete_category(mains.id).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.error_code(), Some(ErrorCode::CategoryHasItems));

    let empty = manager.create_category(&category("Specials", 9)).await.unwrap();
    assert!(manager.delete_category(empty.id).await.unwrap());
    assert_eq!(manager.list_categories(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start();
    let resp = server
        .transport
        .send(RawRequest::get("/health"))
        .await
        .unwrap();
    let health: session_client::HealthResponse = resp.decode().unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.storage_ok);
}
