//! The Order Total Engine, wired as a lifecycle hook.
//!
//! Responsibility: keep `order.total_price` equal to the sum of
//! `price * quantity` over the order's non-deleted line items while the order
//! is open, and copy a product's new price into every line item that
//! references it.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use orderdesk_catalog::{Product, ProductId};
use orderdesk_core::{DomainError, DomainResult, Entity, ExpectedVersion};
use orderdesk_events::Hook;
use orderdesk_orders::{totals, LineItem, LineItemId, Order, OrderId};

use crate::hooks::LifecycleEvent;
use crate::memory::InMemoryTable;

/// Engine behavior toggles.
#[derive(Debug, Clone, Copy)]
pub struct TotalsConfig {
    /// Whether a product price change recomputes the totals of open orders
    /// holding affected line items.
    ///
    /// The system this replaces updated line-item prices on propagation but
    /// never re-ran the total, leaving open orders with stale totals until
    /// the next item mutation. Defaults to `false` to preserve that observed
    /// behavior; turn it on to close the gap.
    pub cascade_price_updates: bool,
}

impl Default for TotalsConfig {
    fn default() -> Self {
        Self {
            cascade_price_updates: false,
        }
    }
}

/// Maintains the denormalized-total invariant in response to lifecycle events.
pub struct TotalsEngine {
    products: Arc<InMemoryTable<Product>>,
    line_items: Arc<InMemoryTable<LineItem>>,
    orders: Arc<InMemoryTable<Order>>,
    config: TotalsConfig,
}

impl TotalsEngine {
    pub fn new(
        products: Arc<InMemoryTable<Product>>,
        line_items: Arc<InMemoryTable<LineItem>>,
        orders: Arc<InMemoryTable<Order>>,
        config: TotalsConfig,
    ) -> Self {
        Self {
            products,
            line_items,
            orders,
            config,
        }
    }

    pub fn config(&self) -> TotalsConfig {
        self.config
    }

    /// Recompute one order's total from its current line items.
    ///
    /// Delivered orders are left untouched. Line-item references that no
    /// longer resolve are skipped (they contribute zero) rather than failing
    /// the whole recomputation.
    pub fn recompute_order(&self, order_id: OrderId, now: DateTime<Utc>) -> DomainResult<()> {
        let (mut order, version) = self.orders.get_versioned(order_id)?;

        if order.is_delivered() {
            tracing::debug!(%order_id, "total frozen, skipping recompute");
            return Ok(());
        }

        let mut items = Vec::with_capacity(order.items().len());
        for item_id in order.items().to_vec() {
            match self.line_items.get(item_id) {
                Ok(item) => items.push(item),
                Err(DomainError::NotFound) => {
                    tracing::warn!(
                        %order_id,
                        %item_id,
                        "order references a missing line item, contributes zero"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        if totals::recompute(&mut order, &items, now) {
            let total = order.total_price();
            self.orders.save(order, ExpectedVersion::Exact(version))?;
            tracing::debug!(%order_id, %total, "order total recomputed");
        }

        Ok(())
    }

    /// Copy a product's current price into every non-deleted line item that
    /// references it, then (if configured) recompute the affected orders.
    fn propagate_price(&self, product_id: ProductId, now: DateTime<Utc>) -> DomainResult<()> {
        let product = self.products.get(product_id)?;
        let price = product.price();

        let affected = self
            .line_items
            .find(|item| item.product_id() == product_id && !item.is_deleted())?;

        let mut touched = Vec::new();
        for item in affected {
            let (mut item, version) = self.line_items.get_versioned(item.id())?;
            item.set_price(price, now);
            let item_id = item.id();
            self.line_items.save(item, ExpectedVersion::Exact(version))?;
            tracing::debug!(%product_id, %item_id, %price, "line item price propagated");

            if self.config.cascade_price_updates {
                for order_id in self.orders_containing(item_id)? {
                    if !touched.contains(&order_id) {
                        touched.push(order_id);
                    }
                }
            }
        }

        for order_id in touched {
            self.recompute_order(order_id, now)?;
        }

        Ok(())
    }

    fn orders_containing(&self, item_id: LineItemId) -> DomainResult<Vec<OrderId>> {
        Ok(self
            .orders
            .find(|order| order.contains_item(item_id))?
            .into_iter()
            .map(|order| order.id())
            .collect())
    }
}

impl Hook<LifecycleEvent> for TotalsEngine {
    fn name(&self) -> &'static str {
        "totals-engine"
    }

    fn on_event(&self, event: &LifecycleEvent) -> DomainResult<()> {
        match event {
            LifecycleEvent::LineItemSaved {
                line_item_id,
                occurred_at,
                ..
            } => {
                // Newly created items are not on any order yet; updated items
                // may be. Either way, every owning order gets a fresh total.
                for order_id in self.orders_containing(*line_item_id)? {
                    self.recompute_order(order_id, *occurred_at)?;
                }
                Ok(())
            }
            LifecycleEvent::OrderItemsChanged {
                order_id,
                occurred_at,
            } => self.recompute_order(*order_id, *occurred_at),
            LifecycleEvent::ProductSaved {
                product_id,
                price_changed,
                occurred_at,
            } => {
                if *price_changed {
                    self.propagate_price(*product_id, *occurred_at)
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use orderdesk_catalog::{CategoryId, DistributionUnit};
    use orderdesk_core::RecordId;
    use orderdesk_customers::CustomerId;

    struct Fixture {
        products: Arc<InMemoryTable<Product>>,
        line_items: Arc<InMemoryTable<LineItem>>,
        orders: Arc<InMemoryTable<Order>>,
        engine: TotalsEngine,
    }

    fn fixture(config: TotalsConfig) -> Fixture {
        let products = Arc::new(InMemoryTable::new());
        let line_items = Arc::new(InMemoryTable::new());
        let orders = Arc::new(InMemoryTable::new());
        let engine = TotalsEngine::new(
            products.clone(),
            line_items.clone(),
            orders.clone(),
            config,
        );
        Fixture {
            products,
            line_items,
            orders,
            engine,
        }
    }

    fn product(price: Decimal) -> Product {
        Product::new(
            ProductId::new(RecordId::new()),
            CategoryId::new(RecordId::new()),
            "Olive oil",
            DistributionUnit::Liter,
            price,
            dec!(0),
            Utc::now(),
        )
        .unwrap()
    }

    fn line_item(product_id: ProductId, price: Decimal, quantity: Decimal) -> LineItem {
        LineItem::new(
            LineItemId::new(RecordId::new()),
            product_id,
            price,
            quantity,
            Utc::now(),
        )
        .unwrap()
    }

    fn order_with(items: &[LineItemId]) -> Order {
        let mut order = Order::new(
            OrderId::new(RecordId::new()),
            CustomerId::new(RecordId::new()),
            "ORD-1",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            Utc::now(),
        )
        .unwrap();
        for id in items {
            order.add_item(*id, Utc::now()).unwrap();
        }
        order
    }

    #[test]
    fn missing_line_item_is_skipped_not_fatal() {
        let fx = fixture(TotalsConfig::default());

        let p = product(dec!(100));
        let live = line_item(p.id(), dec!(100), dec!(3));
        let ghost_id = LineItemId::new(RecordId::new());

        fx.products.insert(p).unwrap();
        fx.line_items.insert(live.clone()).unwrap();

        let order = order_with(&[live.id(), ghost_id]);
        let order_id = order.id();
        fx.orders.insert(order).unwrap();

        fx.engine.recompute_order(order_id, Utc::now()).unwrap();
        assert_eq!(fx.orders.get(order_id).unwrap().total_price(), dec!(300));
    }

    #[test]
    fn recompute_of_missing_order_is_not_found() {
        let fx = fixture(TotalsConfig::default());
        let err = fx
            .engine
            .recompute_order(OrderId::new(RecordId::new()), Utc::now())
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn propagation_updates_item_prices_but_not_totals_by_default() {
        let fx = fixture(TotalsConfig::default());

        let mut p = product(dec!(100));
        let item = line_item(p.id(), dec!(100), dec!(3));
        let order = order_with(&[item.id()]);
        let (product_id, item_id, order_id) = (p.id(), item.id(), order.id());

        fx.products.insert(p.clone()).unwrap();
        fx.line_items.insert(item).unwrap();
        fx.orders.insert(order).unwrap();
        fx.engine.recompute_order(order_id, Utc::now()).unwrap();

        p.set_price(dec!(150), Utc::now()).unwrap();
        fx.products.save(p, ExpectedVersion::Exact(1)).unwrap();

        fx.engine
            .on_event(&LifecycleEvent::ProductSaved {
                product_id,
                price_changed: true,
                occurred_at: Utc::now(),
            })
            .unwrap();

        // Item price follows the product; the order total is stale until the
        // next recompute trigger.
        assert_eq!(fx.line_items.get(item_id).unwrap().price(), dec!(150));
        assert_eq!(fx.orders.get(order_id).unwrap().total_price(), dec!(300));

        fx.engine.recompute_order(order_id, Utc::now()).unwrap();
        assert_eq!(fx.orders.get(order_id).unwrap().total_price(), dec!(450));
    }

    #[test]
    fn propagation_cascades_into_totals_when_configured() {
        let fx = fixture(TotalsConfig {
            cascade_price_updates: true,
        });

        let mut p = product(dec!(100));
        let item = line_item(p.id(), dec!(100), dec!(3));
        let order = order_with(&[item.id()]);
        let (product_id, order_id) = (p.id(), order.id());

        fx.products.insert(p.clone()).unwrap();
        fx.line_items.insert(item).unwrap();
        fx.orders.insert(order).unwrap();
        fx.engine.recompute_order(order_id, Utc::now()).unwrap();

        p.set_price(dec!(150), Utc::now()).unwrap();
        fx.products.save(p, ExpectedVersion::Exact(1)).unwrap();

        fx.engine
            .on_event(&LifecycleEvent::ProductSaved {
                product_id,
                price_changed: true,
                occurred_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(fx.orders.get(order_id).unwrap().total_price(), dec!(450));
    }

    #[test]
    fn propagation_skips_soft_deleted_items() {
        let fx = fixture(TotalsConfig::default());

        let mut p = product(dec!(100));
        let mut item = line_item(p.id(), dec!(100), dec!(3));
        item.soft_delete(Utc::now());
        let item_id = item.id();
        let product_id = p.id();

        fx.products.insert(p.clone()).unwrap();
        fx.line_items.insert(item).unwrap();

        p.set_price(dec!(150), Utc::now()).unwrap();
        fx.products.save(p, ExpectedVersion::Exact(1)).unwrap();

        fx.engine
            .on_event(&LifecycleEvent::ProductSaved {
                product_id,
                price_changed: true,
                occurred_at: Utc::now(),
            })
            .unwrap();

        // Deleted items keep their captured price.
        assert_eq!(fx.line_items.get(item_id).unwrap().price(), dec!(100));
    }

    #[test]
    fn delivered_order_is_never_recomputed() {
        let fx = fixture(TotalsConfig::default());

        let p = product(dec!(100));
        let mut item = line_item(p.id(), dec!(100), dec!(3));
        let item_id = item.id();
        let order = order_with(&[item_id]);
        let order_id = order.id();

        fx.products.insert(p).unwrap();
        fx.line_items.insert(item.clone()).unwrap();
        fx.orders.insert(order.clone()).unwrap();
        fx.engine.recompute_order(order_id, Utc::now()).unwrap();

        let (mut order, version) = fx.orders.get_versioned(order_id).unwrap();
        order.mark_delivered(Utc::now()).unwrap();
        fx.orders.save(order, ExpectedVersion::Exact(version)).unwrap();

        item.set_quantity(dec!(10), Utc::now()).unwrap();
        fx.line_items.save(item, ExpectedVersion::Exact(1)).unwrap();

        fx.engine
            .on_event(&LifecycleEvent::LineItemSaved {
                line_item_id: item_id,
                created: false,
                occurred_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(fx.orders.get(order_id).unwrap().total_price(), dec!(300));
    }
}
