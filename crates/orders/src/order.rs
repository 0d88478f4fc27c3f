use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, RecordId};
use orderdesk_customers::CustomerId;

use crate::line_item::LineItemId;

const MAX_NICK_LEN: usize = 14;
const MAX_NOTES_LEN: usize = 50;
const MAX_INSTAGRAM_LEN: usize = 50;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub RecordId);

impl OrderId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Eft,
}

/// A customer order: an owned, ordered sequence of line-item references plus
/// the denormalized payment figures.
///
/// The order owns its item list outright; a line item belongs to at most one
/// order. `total_price` is maintained by `totals::recompute`, never set by
/// clients. Once `is_delivered` flips (one-way) the total is frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    nick: String,
    items: Vec<LineItemId>,
    delivery_date: NaiveDate,
    payment_method: Option<PaymentMethod>,
    is_delivered: bool,
    is_paid: bool,
    total_price: Decimal,
    received_money: Decimal,
    remaining_debt: Decimal,
    service_fee: Decimal,
    is_instagram: bool,
    instagram_username: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        id: OrderId,
        customer_id: CustomerId,
        nick: &str,
        delivery_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let nick = nick.trim();
        if nick.is_empty() {
            return Err(DomainError::validation("order nick cannot be empty"));
        }
        if nick.chars().count() > MAX_NICK_LEN {
            return Err(DomainError::validation(format!(
                "order nick cannot exceed {MAX_NICK_LEN} characters"
            )));
        }

        Ok(Self {
            id,
            customer_id,
            nick: nick.to_string(),
            items: Vec::new(),
            delivery_date,
            payment_method: None,
            is_delivered: false,
            is_paid: false,
            total_price: Decimal::ZERO,
            received_money: Decimal::ZERO,
            remaining_debt: Decimal::ZERO,
            service_fee: Decimal::ZERO,
            is_instagram: false,
            instagram_username: None,
            notes: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn items(&self) -> &[LineItemId] {
        &self.items
    }

    pub fn contains_item(&self, item_id: LineItemId) -> bool {
        self.items.contains(&item_id)
    }

    pub fn delivery_date(&self) -> NaiveDate {
        self.delivery_date
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn is_delivered(&self) -> bool {
        self.is_delivered
    }

    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn received_money(&self) -> Decimal {
        self.received_money
    }

    pub fn remaining_debt(&self) -> Decimal {
        self.remaining_debt
    }

    pub fn service_fee(&self) -> Decimal {
        self.service_fee
    }

    pub fn is_instagram(&self) -> bool {
        self.is_instagram
    }

    pub fn instagram_username(&self) -> Option<&str> {
        self.instagram_username.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Append a line item to the order. Duplicates are rejected.
    pub fn add_item(&mut self, item_id: LineItemId, now: DateTime<Utc>) -> DomainResult<()> {
        if self.contains_item(item_id) {
            return Err(DomainError::conflict(format!(
                "line item {item_id} is already on this order"
            )));
        }
        self.items.push(item_id);
        self.updated_at = now;
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: LineItemId, now: DateTime<Utc>) -> DomainResult<()> {
        let before = self.items.len();
        self.items.retain(|id| *id != item_id);
        if self.items.len() == before {
            return Err(DomainError::not_found());
        }
        self.updated_at = now;
        Ok(())
    }

    /// One-way transition: `open → delivered`. Freezes the total.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_delivered {
            return Err(DomainError::conflict("order is already delivered"));
        }
        self.is_delivered = true;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod, now: DateTime<Utc>) {
        self.payment_method = Some(method);
        self.updated_at = now;
    }

    pub fn set_service_fee(&mut self, fee: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        if fee < Decimal::ZERO {
            return Err(DomainError::validation("service fee cannot be negative"));
        }
        self.service_fee = fee;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_instagram(&mut self, username: Option<&str>, now: DateTime<Utc>) -> DomainResult<()> {
        match username.map(str::trim) {
            Some("") | None => {
                self.is_instagram = false;
                self.instagram_username = None;
            }
            Some(u) if u.chars().count() > MAX_INSTAGRAM_LEN => {
                return Err(DomainError::validation(format!(
                    "instagram username cannot exceed {MAX_INSTAGRAM_LEN} characters"
                )));
            }
            Some(u) => {
                self.is_instagram = true;
                self.instagram_username = Some(u.to_string());
            }
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: Option<&str>, now: DateTime<Utc>) -> DomainResult<()> {
        self.notes = match notes.map(str::trim) {
            Some("") | None => None,
            Some(n) if n.chars().count() > MAX_NOTES_LEN => {
                return Err(DomainError::validation(format!(
                    "notes cannot exceed {MAX_NOTES_LEN} characters"
                )));
            }
            Some(n) => Some(n.to_string()),
        };
        self.updated_at = now;
        Ok(())
    }

    /// Register money received from the customer and refresh the outstanding
    /// debt against the current total.
    pub fn record_payment(&mut self, amount: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        if amount < Decimal::ZERO {
            return Err(DomainError::validation("payment amount cannot be negative"));
        }
        self.received_money += amount;
        self.remaining_debt = self.total_price - self.received_money;
        self.is_paid = self.remaining_debt <= Decimal::ZERO;
        self.updated_at = now;
        Ok(())
    }

    /// Store a freshly computed total. Crate-internal: only
    /// `totals::recompute` may call this, and only on open orders.
    pub(crate) fn apply_total(&mut self, total: Decimal, now: DateTime<Utc>) {
        debug_assert!(!self.is_delivered);
        self.total_price = total;
        self.updated_at = now;
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> OrderId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order() -> Order {
        Order::new(
            OrderId::new(RecordId::new()),
            CustomerId::new(RecordId::new()),
            "ORD-1",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    fn item_id() -> LineItemId {
        LineItemId::new(RecordId::new())
    }

    #[test]
    fn add_item_rejects_duplicates() {
        let mut o = order();
        let id = item_id();

        o.add_item(id, Utc::now()).unwrap();
        let err = o.add_item(id, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(o.items(), &[id]);
    }

    #[test]
    fn remove_item_of_absent_id_is_not_found() {
        let mut o = order();
        let err = o.remove_item(item_id(), Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn items_keep_insertion_order() {
        let mut o = order();
        let (a, b, c) = (item_id(), item_id(), item_id());
        o.add_item(a, Utc::now()).unwrap();
        o.add_item(b, Utc::now()).unwrap();
        o.add_item(c, Utc::now()).unwrap();
        o.remove_item(b, Utc::now()).unwrap();
        assert_eq!(o.items(), &[a, c]);
    }

    #[test]
    fn mark_delivered_is_one_way() {
        let mut o = order();
        o.mark_delivered(Utc::now()).unwrap();
        assert!(o.is_delivered());

        let err = o.mark_delivered(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(o.is_delivered());
    }

    #[test]
    fn record_payment_tracks_remaining_debt() {
        let mut o = order();
        o.apply_total(dec!(300), Utc::now());

        o.record_payment(dec!(100), Utc::now()).unwrap();
        assert_eq!(o.received_money(), dec!(100));
        assert_eq!(o.remaining_debt(), dec!(200));
        assert!(!o.is_paid());

        o.record_payment(dec!(200), Utc::now()).unwrap();
        assert_eq!(o.remaining_debt(), Decimal::ZERO);
        assert!(o.is_paid());
    }

    #[test]
    fn negative_payment_is_rejected() {
        let mut o = order();
        let err = o.record_payment(dec!(-5), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn instagram_handle_toggles_the_flag() {
        let mut o = order();
        assert!(!o.is_instagram());

        o.set_instagram(Some("tezgah.kadikoy"), Utc::now()).unwrap();
        assert!(o.is_instagram());
        assert_eq!(o.instagram_username(), Some("tezgah.kadikoy"));

        o.set_instagram(None, Utc::now()).unwrap();
        assert!(!o.is_instagram());
        assert_eq!(o.instagram_username(), None);
    }

    #[test]
    fn overlong_instagram_handle_is_rejected() {
        let mut o = order();
        let err = o
            .set_instagram(Some(&"x".repeat(51)), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(!o.is_instagram());
        assert_eq!(o.instagram_username(), None);
    }
}
