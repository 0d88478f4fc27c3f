//! Lifecycle events emitted by the save path.
//!
//! These replace the process-global signal dispatch of the original system:
//! the facade emits one of these after a committed mutation and the
//! [`orderdesk_events::HookBus`] runs the registered hooks synchronously.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_catalog::ProductId;
use orderdesk_events::Event;
use orderdesk_orders::{LineItemId, OrderId};

/// A committed mutation the Order Total Engine cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// A line item was inserted (`created == true`) or updated in place
    /// (quantity change, soft delete, restore).
    LineItemSaved {
        line_item_id: LineItemId,
        created: bool,
        occurred_at: DateTime<Utc>,
    },

    /// An order's item set changed (a line item was added or removed).
    OrderItemsChanged {
        order_id: OrderId,
        occurred_at: DateTime<Utc>,
    },

    /// A product was updated; `price_changed` marks whether the sale price
    /// moved, which is what the propagation trigger keys on.
    ProductSaved {
        product_id: ProductId,
        price_changed: bool,
        occurred_at: DateTime<Utc>,
    },
}

impl Event for LifecycleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::LineItemSaved { .. } => "orders.line_item.saved",
            LifecycleEvent::OrderItemsChanged { .. } => "orders.order.items_changed",
            LifecycleEvent::ProductSaved { .. } => "catalog.product.saved",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LifecycleEvent::LineItemSaved { occurred_at, .. }
            | LifecycleEvent::OrderItemsChanged { occurred_at, .. }
            | LifecycleEvent::ProductSaved { occurred_at, .. } => *occurred_at,
        }
    }
}
