//! Guest API client
//!
//! Holds the guest token and session id handed out by join. Calls made
//! before a join fail with [`ClientError::NotJoined`].

use std::sync::RwLock;

use http::HeaderName;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use shared::dto::{
    AddCartItemRequest, BillSplit, GuestMenuResponse, GuestTableResponse, JoinSessionRequest,
    JoinSessionResponse, SessionDetails, SessionSummary, SetTipRequest, SubmitOrderRequest,
    SubmitScope, UpdateCartItemRequest,
};
use shared::models::{CartItem, Order};

use crate::error::{ClientError, ClientResult};
use crate::transport::{RawRequest, Transport};

const GUEST_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-guest-token");

#[derive(Debug, Clone)]
struct Membership {
    session_id: String,
    token: String,
}

/// Guest client over any [`Transport`]
pub struct GuestClient<T> {
    transport: T,
    membership: RwLock<Option<Membership>>,
}

impl<T: Transport> GuestClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            membership: RwLock::new(None),
        }
    }

    /// Resume with a token from an earlier join
    pub fn with_token(transport: T, session_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            transport,
            membership: RwLock::new(Some(Membership {
                session_id: session_id.into(),
                token: token.into(),
            })),
        }
    }

    pub fn session_id(&self) -> Option<String> {
        self.membership().map(|m| m.session_id)
    }

    pub fn guest_token(&self) -> Option<String> {
        self.membership().map(|m| m.token)
    }

    // ========== Public ==========

    /// Scan a table QR code: opens a session or joins the live one
    pub async fn join_by_qr(&self, qr_code: &str, guest_name: &str) -> ClientResult<JoinSessionResponse> {
        self.join(&JoinSessionRequest {
            table_qr_code: Some(qr_code.to_string()),
            guest_name: guest_name.to_string(),
            ..Default::default()
        })
        .await
    }

    /// Join with the code shared by the host
    pub async fn join_by_code(
        &self,
        session_code: &str,
        guest_name: &str,
    ) -> ClientResult<JoinSessionResponse> {
        self.join(&JoinSessionRequest {
            session_code: Some(session_code.to_string()),
            guest_name: guest_name.to_string(),
            ..Default::default()
        })
        .await
    }

    pub async fn join(&self, req: &JoinSessionRequest) -> ClientResult<JoinSessionResponse> {
        let resp: JoinSessionResponse = self
            .transport
            .send(RawRequest::post("/guest/sessions/join").json(req)?)
            .await?
            .decode()?;

        *self.write_membership() = Some(Membership {
            session_id: resp.session_id.clone(),
            token: resp.guest_token.clone(),
        });
        Ok(resp)
    }

    pub async fn table(&self, qr_code: &str) -> ClientResult<GuestTableResponse> {
        self.transport
            .send(RawRequest::get(format!("/guest/tables/{qr_code}")))
            .await?
            .decode()
    }

    pub async fn menu(&self, restaurant_id: i64) -> ClientResult<GuestMenuResponse> {
        self.transport
            .send(RawRequest::get(format!(
                "/guest/restaurants/{restaurant_id}/menu"
            )))
            .await?
            .decode()
    }

    // ========== Session (guest token) ==========

    pub async fn get_session(&self) -> ClientResult<SessionDetails> {
        self.call(RawRequest::get, "").await
    }

    pub async fn add_to_cart(&self, req: &AddCartItemRequest) -> ClientResult<CartItem> {
        self.call_json(RawRequest::post, "/cart", req).await
    }

    pub async fn update_cart_item(
        &self,
        cart_item_id: &str,
        req: &UpdateCartItemRequest,
    ) -> ClientResult<CartItem> {
        self.call_json(RawRequest::put, &format!("/cart/{cart_item_id}"), req)
            .await
    }

    pub async fn remove_cart_item(&self, cart_item_id: &str) -> ClientResult<bool> {
        self.call(RawRequest::delete, &format!("/cart/{cart_item_id}"))
            .await
    }

    pub async fn submit_order(&self, scope: SubmitScope) -> ClientResult<Order> {
        self.call_json(RawRequest::post, "/orders", &SubmitOrderRequest { scope })
            .await
    }

    pub async fn orders(&self) -> ClientResult<Vec<Order>> {
        self.call(RawRequest::get, "/orders").await
    }

    /// Leave the session; the stored token is dropped on success
    pub async fn leave(&self) -> ClientResult<SessionSummary> {
        let summary = self.call(RawRequest::post, "/leave").await?;
        *self.write_membership() = None;
        Ok(summary)
    }

    pub async fn call_waiter(&self) -> ClientResult<SessionSummary> {
        self.call(RawRequest::post, "/call-waiter").await
    }

    pub async fn request_bill(&self) -> ClientResult<SessionSummary> {
        self.call(RawRequest::post, "/request-bill").await
    }

    pub async fn set_tip(&self, amount: Decimal) -> ClientResult<SessionSummary> {
        self.call_json(RawRequest::put, "/tip", &SetTipRequest { amount })
            .await
    }

    pub async fn bill(&self) -> ClientResult<BillSplit> {
        self.call(RawRequest::get, "/bill").await
    }

    // ========== Internals ==========

    fn membership(&self) -> Option<Membership> {
        self.membership
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn write_membership(&self) -> std::sync::RwLockWriteGuard<'_, Option<Membership>> {
        self.membership
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn request(&self, make: fn(String) -> RawRequest, suffix: &str) -> ClientResult<RawRequest> {
        let m = self.membership().ok_or(ClientError::NotJoined)?;
        make(format!("/guest/sessions/{}{suffix}", m.session_id)).header(GUEST_TOKEN_HEADER, &m.token)
    }

    async fn call<R: DeserializeOwned>(
        &self,
        make: fn(String) -> RawRequest,
        suffix: &str,
    ) -> ClientResult<R> {
        let request = self.request(make, suffix)?;
        self.transport.send(request).await?.decode()
    }

    async fn call_json<R, B>(
        &self,
        make: fn(String) -> RawRequest,
        suffix: &str,
        body: &B,
    ) -> ClientResult<R>
    where
        R: DeserializeOwned,
        B: serde::Serialize + Sync,
    {
        let request = self.request(make, suffix)?.json(body)?;
        self.transport.send(request).await?.decode()
    }
}
