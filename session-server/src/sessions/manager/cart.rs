//! Shared cart and order aggregation

use super::membership::touch_guest;
use super::{AccessScope, SessionManager, optional_text};
use crate::sessions::error::{SessionError, SessionResult};
use crate::sessions::money::{line_total, normalize_tip, recompute_totals};
use crate::utils::validation::{MAX_INSTRUCTIONS_LEN, MAX_QUANTITY};
use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::dto::{AddCartItemRequest, SessionEventKind, SubmitScope, UpdateCartItemRequest};
use shared::models::{
    CartItem, DiningSession, MenuItem, Order, OrderItem, OrderStatus, SessionStatus,
};
use shared::util::now_millis;

fn validate_quantity(quantity: i32) -> SessionResult<()> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(SessionError::Validation(format!(
            "quantity must be between 1 and {}, got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

fn require_active(session: &DiningSession) -> SessionResult<()> {
    if session.status != SessionStatus::Active {
        return Err(SessionError::SessionClosed(session.status));
    }
    Ok(())
}

impl SessionManager {
    fn menu_item_for_session_txn(
        &self,
        txn: &WriteTransaction,
        session: &DiningSession,
        menu_item_id: i64,
    ) -> SessionResult<Option<MenuItem>> {
        Ok(self
            .storage
            .get_menu_item_txn(txn, menu_item_id)?
            .filter(|item| item.restaurant_id == session.restaurant_id))
    }

    /// Add a line to the shared cart
    ///
    /// The item must belong to the session's restaurant and be orderable; the
    /// variation, if any, must be active on that item.
    pub fn add_to_cart(
        &self,
        session_id: &str,
        token: &str,
        req: &AddCartItemRequest,
    ) -> SessionResult<CartItem> {
        validate_quantity(req.quantity)?;
        let instructions = optional_text(
            "specialInstructions",
            req.special_instructions.as_deref(),
            MAX_INSTRUCTIONS_LEN,
        )?;

        let txn = self.storage.begin_write()?;
        let (mut session, guest_id) = self.authorize_txn(&txn, session_id, token)?;
        require_active(&session)?;

        let item = self
            .menu_item_for_session_txn(&txn, &session, req.menu_item_id)?
            .ok_or(SessionError::MenuItemNotFound(req.menu_item_id))?;
        if !item.is_orderable() {
            return Err(SessionError::MenuItemUnavailable(item.name));
        }
        let variation = match req.variation_id {
            Some(id) => Some(item.variation(id).ok_or(SessionError::VariationNotFound(id))?),
            None => None,
        };
        let unit_price = item.unit_price(variation);
        if unit_price < Decimal::ZERO {
            return Err(SessionError::Validation(format!(
                "unit price of {} is negative",
                item.name
            )));
        }

        let now = now_millis();
        let guest_name = session
            .guest(&guest_id)
            .map(|g| g.name.clone())
            .unwrap_or_default();
        let cart_item = CartItem {
            id: uuid::Uuid::new_v4().to_string(),
            guest_id: guest_id.clone(),
            guest_name,
            menu_item_id: item.id,
            variation_id: variation.map(|v| v.id),
            name: item.name.clone(),
            variation_name: variation.map(|v| v.name.clone()),
            quantity: req.quantity,
            unit_price,
            special_instructions: instructions,
            added_at: now,
        };
        session.cart_items.push(cart_item.clone());
        touch_guest(&mut session, &guest_id, now);

        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        tracing::debug!(
            session_id,
            cart_item_id = %cart_item.id,
            menu_item_id = cart_item.menu_item_id,
            quantity = cart_item.quantity,
            "Cart item added"
        );
        self.publish(&session, SessionEventKind::CartUpdated);
        Ok(cart_item)
    }

    /// Load an active session and a cart item the caller may modify
    fn editable_cart_item_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        token: &str,
        cart_item_id: &str,
    ) -> SessionResult<(DiningSession, String, usize)> {
        let (session, guest_id) = self.authorize_txn(txn, session_id, token)?;
        require_active(&session)?;

        let idx = session
            .cart_items
            .iter()
            .position(|c| c.id == cart_item_id)
            .ok_or_else(|| SessionError::CartItemNotFound(cart_item_id.to_string()))?;
        if session.cart_items[idx].guest_id != guest_id && !session.is_host(&guest_id) {
            return Err(SessionError::NotItemOwner);
        }
        Ok((session, guest_id, idx))
    }

    /// Change quantity and instructions of a cart line
    pub fn update_cart_item(
        &self,
        session_id: &str,
        token: &str,
        cart_item_id: &str,
        req: &UpdateCartItemRequest,
    ) -> SessionResult<CartItem> {
        validate_quantity(req.quantity)?;
        let instructions = optional_text(
            "specialInstructions",
            req.special_instructions.as_deref(),
            MAX_INSTRUCTIONS_LEN,
        )?;

        let txn = self.storage.begin_write()?;
        let (mut session, guest_id, idx) =
            self.editable_cart_item_txn(&txn, session_id, token, cart_item_id)?;

        let item = &mut session.cart_items[idx];
        item.quantity = req.quantity;
        item.special_instructions = instructions;
        let updated = item.clone();
        touch_guest(&mut session, &guest_id, now_millis());

        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        self.publish(&session, SessionEventKind::CartUpdated);
        Ok(updated)
    }

    pub fn remove_cart_item(
        &self,
        session_id: &str,
        token: &str,
        cart_item_id: &str,
    ) -> SessionResult<()> {
        let txn = self.storage.begin_write()?;
        let (mut session, guest_id, idx) =
            self.editable_cart_item_txn(&txn, session_id, token, cart_item_id)?;

        session.cart_items.remove(idx);
        touch_guest(&mut session, &guest_id, now_millis());

        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        self.publish(&session, SessionEventKind::CartUpdated);
        Ok(())
    }

    /// Convert pending cart items into one immutable order
    ///
    /// `Mine` submits the caller's items, `All` (host only) the whole table.
    /// Names and prices are re-read from the menu. If any line has become
    /// unavailable the submission fails and the cart is left untouched.
    pub fn submit_order(
        &self,
        session_id: &str,
        token: &str,
        scope: SubmitScope,
    ) -> SessionResult<Order> {
        let txn = self.storage.begin_write()?;
        let (mut session, guest_id) = self.authorize_txn(&txn, session_id, token)?;
        require_active(&session)?;

        if scope == SubmitScope::All && !session.is_host(&guest_id) {
            return Err(SessionError::HostRequired);
        }

        let (selected, remaining): (Vec<CartItem>, Vec<CartItem>) = session
            .cart_items
            .iter()
            .cloned()
            .partition(|c| scope == SubmitScope::All || c.guest_id == guest_id);
        if selected.is_empty() {
            return Err(SessionError::EmptyCart);
        }

        let mut items = Vec::with_capacity(selected.len());
        for line in &selected {
            let menu_item = self
                .menu_item_for_session_txn(&txn, &session, line.menu_item_id)?
                .filter(|m| m.is_orderable())
                .ok_or_else(|| SessionError::MenuItemUnavailable(line.name.clone()))?;
            let variation = match line.variation_id {
                Some(id) => Some(menu_item.variation(id).ok_or_else(|| {
                    SessionError::MenuItemUnavailable(format!(
                        "{} ({})",
                        menu_item.name,
                        line.variation_name.as_deref().unwrap_or_default()
                    ))
                })?),
                None => None,
            };
            let unit_price = menu_item.unit_price(variation);
            items.push(OrderItem {
                id: uuid::Uuid::new_v4().to_string(),
                menu_item_id: menu_item.id,
                variation_id: variation.map(|v| v.id),
                item_name: menu_item.name.clone(),
                variation_name: variation.map(|v| v.name.clone()),
                guest_id: line.guest_id.clone(),
                guest_name: line.guest_name.clone(),
                quantity: line.quantity,
                unit_price,
                line_total: line_total(unit_price, line.quantity),
                special_instructions: line.special_instructions.clone(),
            });
        }

        let now = now_millis();
        let guest_name = session
            .guest(&guest_id)
            .map(|g| g.name.clone())
            .unwrap_or_default();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            guest_id: guest_id.clone(),
            guest_name,
            status: OrderStatus::Pending,
            subtotal: items.iter().map(|i| i.line_total).sum(),
            items,
            created_at: now,
            updated_at: now,
        };

        session.cart_items = remaining;
        session.orders.push(order.clone());
        recompute_totals(&mut session);
        touch_guest(&mut session, &guest_id, now);

        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        tracing::info!(
            session_id,
            order_id = %order.id,
            items = order.items.len(),
            subtotal = %order.subtotal,
            "Order submitted"
        );
        self.publish(&session, SessionEventKind::OrderSubmitted);
        Ok(order)
    }

    /// Set the session tip (ACTIVE or AWAITING_PAYMENT)
    pub fn set_tip(
        &self,
        session_id: &str,
        token: &str,
        amount: Decimal,
    ) -> SessionResult<DiningSession> {
        let tip = normalize_tip(amount)?;

        let txn = self.storage.begin_write()?;
        let (mut session, guest_id) = self.authorize_txn(&txn, session_id, token)?;
        if !matches!(
            session.status,
            SessionStatus::Active | SessionStatus::AwaitingPayment
        ) {
            return Err(SessionError::SessionClosed(session.status));
        }

        session.totals.tip = tip;
        recompute_totals(&mut session);
        touch_guest(&mut session, &guest_id, now_millis());

        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        self.publish(&session, SessionEventKind::TipUpdated);
        Ok(session)
    }

    /// Orders of a session, oldest first
    pub fn list_orders(&self, session_id: &str, token: &str) -> SessionResult<Vec<Order>> {
        self.validate_for_session(session_id, token)?;
        Ok(self.load_session(session_id)?.orders)
    }

    /// Staff: move an order forward along the kitchen flow
    ///
    /// Cancellation is only possible before preparation starts and removes
    /// the order from the totals.
    pub fn advance_order_status(
        &self,
        scope: AccessScope,
        session_id: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> SessionResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut session = self.load_session_txn(&txn, session_id)?;
        scope.check(session.restaurant_id)?;
        if session.status.is_terminal() {
            return Err(SessionError::SessionClosed(session.status));
        }

        let now = now_millis();
        let order = session
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| SessionError::OrderNotFound(order_id.to_string()))?;
        if !order.status.can_advance_to(status) {
            return Err(SessionError::InvalidOrderTransition {
                from: order.status,
                to: status,
            });
        }
        order.status = status;
        order.updated_at = now;
        let updated = order.clone();

        if status.is_cancelled() {
            recompute_totals(&mut session);
        }
        session.updated_at = now;

        self.storage.put_session(&txn, &session)?;
        Self::commit(txn)?;

        tracing::info!(session_id, order_id, status = ?status, "Order status changed");
        self.publish(&session, SessionEventKind::OrderStatusChanged);
        Ok(updated)
    }
}
