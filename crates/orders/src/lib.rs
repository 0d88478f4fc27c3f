//! Orders domain module: line items, orders, and total recomputation.
//!
//! The one non-trivial rule in this system lives here: while an order is not
//! yet delivered, its denormalized `total_price` must equal the sum of
//! `price * quantity` over its non-deleted line items. `totals::recompute`
//! enforces that; the store layer decides when it runs.

pub mod line_item;
pub mod order;
pub mod totals;

pub use line_item::{LineItem, LineItemId};
pub use order::{Order, OrderId, PaymentMethod};
pub use totals::recompute;
