//! Order total recomputation.
//!
//! Invariant: while an order is not yet delivered,
//! `total_price == Σ price * quantity` over its non-deleted line items.
//! Delivered orders are frozen and never touched again.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::line_item::LineItem;
use crate::order::Order;

/// Sum the contributions of the given line items.
pub fn order_total<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a LineItem>,
{
    items.into_iter().map(LineItem::contribution).sum()
}

/// Recompute an order's total from the line items the caller resolved.
///
/// Returns `true` when the total was recomputed and stored, `false` when the
/// order is delivered (frozen) and was left untouched. Line items that are
/// soft-deleted contribute zero; line items the caller could not resolve are
/// simply absent from `items` and therefore contribute zero as well.
pub fn recompute(order: &mut Order, items: &[LineItem], now: DateTime<Utc>) -> bool {
    if order.is_delivered() {
        return false;
    }

    let total = order_total(items);
    order.apply_total(total, now);
    true
}
