//! Staff API client
//!
//! Every authenticated call attaches the stored access token. A 401 triggers
//! exactly one `/auth/refresh` and a retry. A refresh rejected with 401/403
//! clears the store and yields [`ClientError::Unauthorized`]; transport and
//! server errors are returned as-is with the credentials kept.

use http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::client::{LoginRequest, LoginResponse, RefreshRequest, UserInfo};
use shared::dto::{
    Page, PageQuery, SessionDetails, SessionHistoryEntry, SessionSummary,
    UpdateOrderStatusRequest,
};
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, MenuCategory, MenuCategoryCreate,
    MenuCategoryUpdate, MenuItem, MenuItemCreate, MenuItemUpdate, Order, OrderStatus, Restaurant,
    RestaurantCreate, RestaurantSettingsUpdate,
};

use crate::credentials::{CredentialStore, Credentials, MemoryCredentialStore};
use crate::error::{ClientError, ClientResult};
use crate::transport::{RawRequest, Transport};

/// Staff client over any [`Transport`]
pub struct StaffClient<T, C = MemoryCredentialStore> {
    transport: T,
    credentials: C,
}

impl<T: Transport> StaffClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_credentials(transport, MemoryCredentialStore::new())
    }
}

impl<T: Transport, C: CredentialStore> StaffClient<T, C> {
    pub fn with_credentials(transport: T, credentials: C) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.load().is_some()
    }

    // ========== Auth ==========

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self
            .transport
            .send(RawRequest::post("/auth/login").json(&req)?)
            .await?
            .decode()?;
        self.save(&resp);
        Ok(resp)
    }

    /// Exchange the stored refresh token for a new pair
    pub async fn refresh(&self) -> ClientResult<LoginResponse> {
        let Some(creds) = self.credentials.load() else {
            return Err(ClientError::Unauthorized);
        };
        let req = RefreshRequest {
            refresh_token: creds.refresh_token,
        };
        let result = self
            .transport
            .send(RawRequest::post("/auth/refresh").json(&req)?)
            .await
            .and_then(|resp| resp.decode::<LoginResponse>());

        match result {
            Ok(resp) => {
                self.save(&resp);
                Ok(resp)
            }
            Err(e) if matches!(e.status(), Some(401 | 403)) => {
                tracing::debug!(error = %e, "Refresh token rejected, clearing credentials");
                self.credentials.clear();
                Err(ClientError::Unauthorized)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Token refresh failed");
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.credentials.clear();
    }

    pub async fn me(&self) -> ClientResult<UserInfo> {
        self.call(RawRequest::get("/auth/me")).await
    }

    // ========== Sessions ==========

    pub async fn active_sessions(&self, restaurant_id: i64) -> ClientResult<Vec<SessionDetails>> {
        self.call(RawRequest::get(format!(
            "/sessions/restaurant/{restaurant_id}/active"
        )))
        .await
    }

    pub async fn session_history(
        &self,
        restaurant_id: i64,
        query: PageQuery,
    ) -> ClientResult<Page<SessionHistoryEntry>> {
        let mut params = Vec::new();
        if let Some(page) = query.page {
            params.push(format!("page={page}"));
        }
        if let Some(size) = query.size {
            params.push(format!("size={size}"));
        }
        let mut path = format!("/sessions/restaurant/{restaurant_id}/history");
        if !params.is_empty() {
            path = format!("{path}?{}", params.join("&"));
        }
        self.call(RawRequest::get(path)).await
    }

    pub async fn session_details(&self, session_id: &str) -> ClientResult<SessionDetails> {
        self.call(RawRequest::get(format!("/sessions/{session_id}/details")))
            .await
    }

    pub async fn end_session(&self, session_id: &str) -> ClientResult<SessionSummary> {
        self.session_action(session_id, "end").await
    }

    pub async fn pause_session(&self, session_id: &str) -> ClientResult<SessionSummary> {
        self.session_action(session_id, "pause").await
    }

    pub async fn resume_session(&self, session_id: &str) -> ClientResult<SessionSummary> {
        self.session_action(session_id, "resume").await
    }

    pub async fn cancel_session(&self, session_id: &str) -> ClientResult<SessionSummary> {
        self.session_action(session_id, "cancel").await
    }

    pub async fn acknowledge_waiter(&self, session_id: &str) -> ClientResult<SessionSummary> {
        self.session_action(session_id, "waiter/acknowledge").await
    }

    pub async fn update_order_status(
        &self,
        session_id: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> ClientResult<Order> {
        let path = format!("/sessions/{session_id}/orders/{order_id}/status");
        self.call_json(RawRequest::put(path), &UpdateOrderStatusRequest { status })
            .await
    }

    // ========== Tables ==========

    pub async fn list_tables(&self, restaurant_id: Option<i64>) -> ClientResult<Vec<DiningTable>> {
        self.call(RawRequest::get(with_restaurant("/tables", restaurant_id)))
            .await
    }

    pub async fn get_table(&self, table_id: i64) -> ClientResult<DiningTable> {
        self.call(RawRequest::get(format!("/tables/{table_id}"))).await
    }

    pub async fn create_table(&self, req: &DiningTableCreate) -> ClientResult<DiningTable> {
        self.call_json(RawRequest::post("/tables"), req).await
    }

    pub async fn update_table(
        &self,
        table_id: i64,
        req: &DiningTableUpdate,
    ) -> ClientResult<DiningTable> {
        self.call_json(RawRequest::put(format!("/tables/{table_id}")), req)
            .await
    }

    pub async fn regenerate_qr_code(&self, table_id: i64) -> ClientResult<DiningTable> {
        self.call(RawRequest::post(format!("/tables/{table_id}/qr-code")))
            .await
    }

    // ========== Menu ==========

    pub async fn list_menu_items(&self, restaurant_id: Option<i64>) -> ClientResult<Vec<MenuItem>> {
        self.call(RawRequest::get(with_restaurant("/menu/items", restaurant_id)))
            .await
    }

    pub async fn create_menu_item(&self, req: &MenuItemCreate) -> ClientResult<MenuItem> {
        self.call_json(RawRequest::post("/menu/items"), req).await
    }

    pub async fn update_menu_item(&self, item_id: i64, req: &MenuItemUpdate) -> ClientResult<MenuItem> {
        self.call_json(RawRequest::put(format!("/menu/items/{item_id}")), req)
            .await
    }

    pub async fn list_categories(&self, restaurant_id: Option<i64>) -> ClientResult<Vec<MenuCategory>> {
        self.call(RawRequest::get(with_restaurant("/menu/categories", restaurant_id)))
            .await
    }

    pub async fn create_category(&self, req: &MenuCategoryCreate) -> ClientResult<MenuCategory> {
        self.call_json(RawRequest::post("/menu/categories"), req).await
    }

    pub async fn update_category(
        &self,
        category_id: i64,
        req: &MenuCategoryUpdate,
    ) -> ClientResult<MenuCategory> {
        self.call_json(RawRequest::put(format!("/menu/categories/{category_id}")), req)
            .await
    }

    pub async fn delete_category(&self, category_id: i64) -> ClientResult<bool> {
        self.call(RawRequest::delete(format!("/menu/categories/{category_id}")))
            .await
    }

    // ========== Restaurants ==========

    pub async fn create_restaurant(&self, req: &RestaurantCreate) -> ClientResult<Restaurant> {
        self.call_json(RawRequest::post("/restaurants"), req).await
    }

    pub async fn get_settings(&self, restaurant_id: i64) -> ClientResult<Restaurant> {
        self.call(RawRequest::get(format!("/restaurants/{restaurant_id}/settings")))
            .await
    }

    pub async fn update_settings(
        &self,
        restaurant_id: i64,
        req: &RestaurantSettingsUpdate,
    ) -> ClientResult<Restaurant> {
        let path = format!("/restaurants/{restaurant_id}/settings");
        self.call_json(RawRequest::put(path), req).await
    }

    // ========== Internals ==========

    fn save(&self, resp: &LoginResponse) {
        self.credentials.store(Credentials {
            access_token: resp.access_token.clone(),
            refresh_token: resp.refresh_token.clone(),
        });
    }

    async fn session_action(&self, session_id: &str, action: &str) -> ClientResult<SessionSummary> {
        self.call(RawRequest::post(format!("/sessions/{session_id}/{action}")))
            .await
    }

    async fn call_json<R, B>(&self, request: RawRequest, body: &B) -> ClientResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(request.json(body)?).await
    }

    /// Send with the access token, refreshing once on 401
    async fn call<R: DeserializeOwned>(&self, request: RawRequest) -> ClientResult<R> {
        let creds = self.credentials.load().ok_or(ClientError::Unauthorized)?;
        let resp = self
            .transport
            .send(request.clone().bearer(&creds.access_token)?)
            .await?;
        if resp.status != StatusCode::UNAUTHORIZED {
            return resp.decode();
        }

        let refreshed = self.refresh().await?;
        let resp = self
            .transport
            .send(request.bearer(&refreshed.access_token)?)
            .await?;
        if resp.status == StatusCode::UNAUTHORIZED {
            self.credentials.clear();
            return Err(ClientError::Unauthorized);
        }
        resp.decode()
    }
}

fn with_restaurant(path: &str, restaurant_id: Option<i64>) -> String {
    match restaurant_id {
        Some(id) => format!("{path}?restaurantId={id}"),
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RawResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted transport: pops canned responses, records requests
    struct Scripted {
        responses: Mutex<Vec<ClientResult<RawResponse>>>,
        seen: Mutex<Vec<RawRequest>>,
    }

    impl Scripted {
        fn new(responses: Vec<RawResponse>) -> Self {
            Self::with_results(responses.into_iter().map(Ok).collect())
        }

        fn with_results(mut responses: Vec<ClientResult<RawResponse>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn send(&self, request: RawRequest) -> ClientResult<RawResponse> {
            self.seen.lock().unwrap().push(request);
            self.responses.lock().unwrap().pop().expect("no scripted response")
        }
    }

    fn json(status: StatusCode, value: serde_json::Value) -> RawResponse {
        RawResponse {
            status,
            body: serde_json::to_vec(&value).unwrap(),
        }
    }

    fn login_body(access: &str) -> serde_json::Value {
        serde_json::json!({
            "accessToken": access,
            "refreshToken": format!("{access}-refresh"),
            "tokenType": "Bearer",
            "expiresIn": 3600,
            "user": {"id": 1, "username": "mgr", "role": "manager", "permissions": [], "restaurantId": 1}
        })
    }

    fn unauthorized() -> RawResponse {
        json(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"code": 1003, "message": "expired", "status": 401, "timestamp": "t"}),
        )
    }

    fn logged_in(transport: Scripted) -> StaffClient<Scripted> {
        let client = StaffClient::new(transport);
        client.credentials().store(Credentials {
            access_token: "old".into(),
            refresh_token: "old-refresh".into(),
        });
        client
    }

    fn auth_header(req: &RawRequest) -> Option<String> {
        req.headers
            .iter()
            .find(|(name, _)| *name == http::header::AUTHORIZATION)
            .map(|(_, v)| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_call_without_login_is_unauthorized() {
        let client = StaffClient::new(Scripted::new(vec![]));
        assert!(matches!(client.me().await, Err(ClientError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_refresh_then_retry_on_401() {
        let me = serde_json::json!({"id": 1, "username": "mgr", "role": "manager", "permissions": [], "restaurantId": 1});
        let client = logged_in(Scripted::new(vec![
            unauthorized(),
            json(StatusCode::OK, login_body("new")),
            json(StatusCode::OK, me),
        ]));

        let user = client.me().await.unwrap();
        assert_eq!(user.username, "mgr");
        assert_eq!(client.credentials().load().unwrap().access_token, "new");

        let seen = client.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1].path, "/auth/refresh");
        assert_eq!(auth_header(&seen[2]).as_deref(), Some("Bearer new"));
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_credentials() {
        let client = logged_in(Scripted::new(vec![unauthorized(), unauthorized()]));

        assert!(matches!(client.me().await, Err(ClientError::Unauthorized)));
        assert!(!client.is_logged_in());
    }

    #[tokio::test]
    async fn test_refresh_transport_error_keeps_credentials() {
        let client = logged_in(Scripted::with_results(vec![
            Ok(unauthorized()),
            Err(ClientError::Transport("connection timed out".into())),
        ]));

        assert!(matches!(client.me().await, Err(ClientError::Transport(_))));
        assert!(client.is_logged_in());
    }

    #[tokio::test]
    async fn test_refresh_server_error_keeps_credentials() {
        let client = logged_in(Scripted::new(vec![
            unauthorized(),
            json(
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({"code": 9002, "message": "db", "status": 500, "timestamp": "t"}),
            ),
        ]));

        let err = client.me().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(client.credentials().load().unwrap().refresh_token, "old-refresh");
    }

    #[tokio::test]
    async fn test_business_errors_not_retried() {
        let client = logged_in(Scripted::new(vec![json(
            StatusCode::CONFLICT,
            serde_json::json!({"code": 4003, "message": "bad transition", "status": 409, "timestamp": "t"}),
        )]));

        let err = client.end_session("s1").await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(client.transport.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_with_restaurant_query() {
        assert_eq!(with_restaurant("/tables", Some(4)), "/tables?restaurantId=4");
        assert_eq!(with_restaurant("/tables", None), "/tables");
    }
}
