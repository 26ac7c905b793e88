//! Money calculation for dining sessions
//!
//! All intermediate values keep full `Decimal` precision. Rounding is
//! half-up (`MidpointAwayFromZero`) to 2 places and only applies to presented
//! figures: tax, service charge and the final total. The total is rounded
//! from the unrounded components, so `tax + service_charge` may differ from
//! `total - subtotal - tip` by a cent.

use rust_decimal::prelude::*;
use shared::dto::{BillSplit, GuestShare};
use shared::models::{DiningSession, SessionTotals};

use super::error::SessionError;

/// Rounding scale for monetary values
const DECIMAL_PLACES: u32 = 2;

/// Maximum tip amount accepted
const MAX_TIP: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Maximum item price accepted by menu administration
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Round to 2 decimal places, half-up
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price × quantity`
#[inline]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Derive session totals from a subtotal and the snapshotted rates
pub fn compute_totals(
    subtotal: Decimal,
    tax_rate: Decimal,
    service_charge_rate: Decimal,
    tip: Decimal,
) -> SessionTotals {
    let tax = subtotal * tax_rate;
    let service_charge = subtotal * service_charge_rate;
    SessionTotals {
        subtotal,
        tax: round_money(tax),
        service_charge: round_money(service_charge),
        tip,
        total: round_money(subtotal + tax + service_charge + tip),
    }
}

/// Σ line totals over non-cancelled orders
pub fn billable_subtotal(session: &DiningSession) -> Decimal {
    session
        .billable_orders()
        .flat_map(|order| order.items.iter())
        .map(|item| line_total(item.unit_price, item.quantity))
        .sum()
}

/// Recompute `session.totals` from its orders (keeps the current tip)
pub fn recompute_totals(session: &mut DiningSession) {
    let subtotal = billable_subtotal(session);
    session.totals = compute_totals(
        subtotal,
        session.tax_rate,
        session.service_charge_rate,
        session.totals.tip,
    );
}

/// Validate a tip and normalize it to 2 places
pub fn normalize_tip(amount: Decimal) -> Result<Decimal, SessionError> {
    if amount < Decimal::ZERO {
        return Err(SessionError::InvalidTip(format!(
            "tip must be non-negative, got {}",
            amount
        )));
    }
    if amount > MAX_TIP {
        return Err(SessionError::InvalidTip(format!(
            "tip exceeds maximum allowed ({}), got {}",
            MAX_TIP, amount
        )));
    }
    Ok(round_money(amount))
}

/// Validate a tax or service-charge rate (a fraction in `[0, 1]`)
pub fn validate_rate(field: &str, rate: Decimal) -> Result<(), SessionError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(SessionError::Validation(format!(
            "{} must be between 0 and 1, got {}",
            field, rate
        )));
    }
    Ok(())
}

/// Validate a menu price or variation-adjusted unit price
pub fn validate_price(field: &str, price: Decimal) -> Result<(), SessionError> {
    if price < Decimal::ZERO {
        return Err(SessionError::Validation(format!(
            "{} must be non-negative, got {}",
            field, price
        )));
    }
    if price > MAX_PRICE {
        return Err(SessionError::Validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Split the bill per guest
///
/// Each guest pays the line totals they contributed, a proportional share of
/// tax and service charge, and an equal share of the tip. Shares are rounded
/// half-up; the rounding remainder goes to the host so that the shares sum to
/// `session.totals.total`.
///
/// Guests who left without contributing anything are not billed.
pub fn split_bill(session: &DiningSession, currency: &str) -> BillSplit {
    let subtotal = billable_subtotal(session);
    let tax = subtotal * session.tax_rate;
    let service_charge = subtotal * session.service_charge_rate;
    let tip = session.totals.tip;
    let total = round_money(subtotal + tax + service_charge + tip);

    let contributed = |guest_id: &str| -> Decimal {
        session
            .billable_orders()
            .flat_map(|order| order.items.iter())
            .filter(|item| item.guest_id == guest_id)
            .map(|item| line_total(item.unit_price, item.quantity))
            .sum()
    };

    let payers: Vec<(&shared::models::SessionGuest, Decimal)> = session
        .guests
        .iter()
        .map(|g| (g, contributed(&g.id)))
        .filter(|(g, items)| g.is_host || g.left_at.is_none() || !items.is_zero())
        .collect();

    let tip_share = if payers.is_empty() {
        Decimal::ZERO
    } else {
        tip / Decimal::from(payers.len())
    };

    let mut shares: Vec<GuestShare> = payers
        .iter()
        .map(|(guest, items)| {
            let (guest_tax, guest_service) = if subtotal.is_zero() {
                (Decimal::ZERO, Decimal::ZERO)
            } else {
                let weight = *items / subtotal;
                (tax * weight, service_charge * weight)
            };
            GuestShare {
                guest_id: guest.id.clone(),
                guest_name: guest.name.clone(),
                is_host: guest.is_host,
                items_subtotal: *items,
                tax: round_money(guest_tax),
                service_charge: round_money(guest_service),
                tip: round_money(tip_share),
                total: round_money(*items + guest_tax + guest_service + tip_share),
            }
        })
        .collect();

    let assigned: Decimal = shares.iter().map(|s| s.total).sum();
    let remainder = total - assigned;
    if !remainder.is_zero() {
        let idx = shares.iter().position(|s| s.is_host).unwrap_or(0);
        if let Some(share) = shares.get_mut(idx) {
            share.total += remainder;
        }
    }

    BillSplit {
        session_id: session.id.clone(),
        currency: currency.to_string(),
        subtotal,
        tax: round_money(tax),
        service_charge: round_money(service_charge),
        tip,
        total,
        shares,
    }
}
