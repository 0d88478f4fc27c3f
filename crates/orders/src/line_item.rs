use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, RecordId};
use orderdesk_catalog::ProductId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub RecordId);

impl LineItemId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One product entry on an order: a captured unit price and a quantity.
///
/// `price` is a snapshot of the product's price taken when the line item was
/// created; the store layer keeps it in sync with later product price changes
/// (propagation). Soft-deleted items stay on the order but contribute zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    id: LineItemId,
    product_id: ProductId,
    price: Decimal,
    quantity: Decimal,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LineItem {
    pub fn new(
        id: LineItemId,
        product_id: ProductId,
        price: Decimal,
        quantity: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        check_quantity(quantity)?;

        Ok(Self {
            id,
            product_id,
            price,
            quantity,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// This item's share of the order total: `price * quantity`, or zero once
    /// soft-deleted.
    pub fn contribution(&self) -> Decimal {
        if self.is_deleted {
            Decimal::ZERO
        } else {
            self.price * self.quantity
        }
    }

    pub fn set_quantity(&mut self, quantity: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        check_quantity(quantity)?;
        self.quantity = quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Overwrite the captured unit price (price propagation from the product).
    pub fn set_price(&mut self, price: Decimal, now: DateTime<Utc>) {
        self.price = price;
        self.updated_at = now;
    }

    /// Mark the item inactive. It stays on the order for the paper trail but
    /// no longer contributes to the total.
    pub fn soft_delete(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.updated_at = now;
    }

    pub fn restore(&mut self, now: DateTime<Utc>) {
        self.is_deleted = false;
        self.updated_at = now;
    }
}

fn check_quantity(quantity: Decimal) -> DomainResult<()> {
    if quantity < Decimal::ZERO {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(())
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> LineItemId {
        self.id
    }
}
