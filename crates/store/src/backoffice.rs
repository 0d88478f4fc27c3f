//! The record-management facade.
//!
//! `Backoffice` owns the tables and the hook bus, and is what an API layer
//! would call into. Every mutating operation persists first, then dispatches
//! the matching lifecycle event; hook failures surface to the caller.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use orderdesk_catalog::{Category, CategoryId, DistributionUnit, Product, ProductId};
use orderdesk_core::{DomainError, DomainResult, Entity, ExpectedVersion, RecordId, UserId};
use orderdesk_customers::{Customer, CustomerId};
use orderdesk_events::{Hook, HookBus};
use orderdesk_geo::{
    Address, AddressId, City, CityId, District, DistrictId, Neighborhood, NeighborhoodId,
};
use orderdesk_orders::{LineItem, LineItemId, Order, OrderId, PaymentMethod};

use crate::engine::{TotalsConfig, TotalsEngine};
use crate::hooks::LifecycleEvent;
use crate::memory::InMemoryTable;

/// In-process order-management backend.
pub struct Backoffice {
    cities: Arc<InMemoryTable<City>>,
    districts: Arc<InMemoryTable<District>>,
    neighborhoods: Arc<InMemoryTable<Neighborhood>>,
    addresses: Arc<InMemoryTable<Address>>,
    customers: Arc<InMemoryTable<Customer>>,
    categories: Arc<InMemoryTable<Category>>,
    products: Arc<InMemoryTable<Product>>,
    line_items: Arc<InMemoryTable<LineItem>>,
    orders: Arc<InMemoryTable<Order>>,
    engine: Arc<TotalsEngine>,
    hooks: HookBus<LifecycleEvent>,
}

impl Backoffice {
    pub fn new() -> Self {
        Self::with_config(TotalsConfig::default())
    }

    pub fn with_config(config: TotalsConfig) -> Self {
        let products = Arc::new(InMemoryTable::new());
        let line_items = Arc::new(InMemoryTable::new());
        let orders = Arc::new(InMemoryTable::new());

        let engine = Arc::new(TotalsEngine::new(
            products.clone(),
            line_items.clone(),
            orders.clone(),
            config,
        ));

        let engine_hook: Arc<dyn Hook<LifecycleEvent>> = engine.clone();
        let hooks = HookBus::with_hooks(vec![engine_hook]);

        Self {
            cities: Arc::new(InMemoryTable::new()),
            districts: Arc::new(InMemoryTable::new()),
            neighborhoods: Arc::new(InMemoryTable::new()),
            addresses: Arc::new(InMemoryTable::new()),
            customers: Arc::new(InMemoryTable::new()),
            categories: Arc::new(InMemoryTable::new()),
            products,
            line_items,
            orders,
            engine,
            hooks,
        }
    }

    // ---- address hierarchy ----

    pub fn add_city(&self, name: &str) -> DomainResult<CityId> {
        let city = City::new(CityId::new(RecordId::new()), name)?;
        let id = city.id();
        self.cities.insert(city)?;
        Ok(id)
    }

    pub fn add_district(
        &self,
        city_id: CityId,
        name: &str,
        nick: Option<&str>,
    ) -> DomainResult<DistrictId> {
        if !self.cities.contains(city_id)? {
            return Err(DomainError::NotFound);
        }
        if let Some(nick) = nick {
            let taken = self
                .districts
                .find(|d| d.nick() == Some(nick.trim()))?;
            if !taken.is_empty() {
                return Err(DomainError::conflict(format!(
                    "district nick '{nick}' is already taken"
                )));
            }
        }

        let district = District::new(DistrictId::new(RecordId::new()), city_id, name, nick)?;
        let id = district.id();
        self.districts.insert(district)?;
        Ok(id)
    }

    pub fn add_neighborhood(
        &self,
        district_id: DistrictId,
        name: &str,
    ) -> DomainResult<NeighborhoodId> {
        if !self.districts.contains(district_id)? {
            return Err(DomainError::NotFound);
        }
        let neighborhood =
            Neighborhood::new(NeighborhoodId::new(RecordId::new()), district_id, name)?;
        let id = neighborhood.id();
        self.neighborhoods.insert(neighborhood)?;
        Ok(id)
    }

    pub fn add_address(
        &self,
        city_id: CityId,
        district_id: DistrictId,
        neighborhood_id: NeighborhoodId,
        extra_info: &str,
    ) -> DomainResult<AddressId> {
        if !self.cities.contains(city_id)?
            || !self.districts.contains(district_id)?
            || !self.neighborhoods.contains(neighborhood_id)?
        {
            return Err(DomainError::NotFound);
        }

        let address = Address::new(
            AddressId::new(RecordId::new()),
            city_id,
            district_id,
            neighborhood_id,
            extra_info,
        )?;
        let id = address.id();
        self.addresses.insert(address)?;
        Ok(id)
    }

    /// Render the delivery slip line for an address.
    pub fn full_address(&self, address_id: AddressId) -> DomainResult<String> {
        let address = self.addresses.get(address_id)?;
        let city = self.cities.get(address.city_id())?;
        let district = self.districts.get(address.district_id())?;
        let neighborhood = self.neighborhoods.get(address.neighborhood_id())?;
        Ok(address.full_address(&city, &district, &neighborhood))
    }

    // ---- customers ----

    pub fn register_customer(
        &self,
        user_id: UserId,
        nick: &str,
        phone1: &str,
        phone2: Option<&str>,
        address_id: AddressId,
    ) -> DomainResult<CustomerId> {
        if !self.addresses.contains(address_id)? {
            return Err(DomainError::NotFound);
        }
        let nick_trimmed = nick.trim();
        if !self.customers.find(|c| c.nick() == nick_trimmed)?.is_empty() {
            return Err(DomainError::conflict(format!(
                "customer nick '{nick_trimmed}' is already taken"
            )));
        }
        let phone_trimmed = phone1.trim();
        if !self
            .customers
            .find(|c| c.phone1() == phone_trimmed)?
            .is_empty()
        {
            return Err(DomainError::conflict(
                "primary phone number is already registered",
            ));
        }

        let customer = Customer::new(
            CustomerId::new(RecordId::new()),
            user_id,
            nick,
            phone1,
            phone2,
            address_id,
        )?;
        let id = customer.id();
        self.customers.insert(customer)?;
        Ok(id)
    }

    pub fn customer(&self, id: CustomerId) -> DomainResult<Customer> {
        self.customers.get(id)
    }

    // ---- catalog ----

    pub fn add_category(&self, name: &str) -> DomainResult<CategoryId> {
        let category = Category::new(CategoryId::new(RecordId::new()), name, Utc::now())?;
        let id = category.id();
        self.categories.insert(category)?;
        Ok(id)
    }

    pub fn add_product(
        &self,
        category_id: CategoryId,
        name: &str,
        unit: DistributionUnit,
        price: Decimal,
        purchase_price: Decimal,
    ) -> DomainResult<ProductId> {
        if !self.categories.contains(category_id)? {
            return Err(DomainError::NotFound);
        }
        let product = Product::new(
            ProductId::new(RecordId::new()),
            category_id,
            name,
            unit,
            price,
            purchase_price,
            Utc::now(),
        )?;
        let id = product.id();
        self.products.insert(product)?;
        Ok(id)
    }

    pub fn product(&self, id: ProductId) -> DomainResult<Product> {
        self.products.get(id)
    }

    /// Change a product's sale price. Propagation into line items (and,
    /// depending on configuration, order totals) happens via the hook.
    pub fn update_product_price(&self, id: ProductId, price: Decimal) -> DomainResult<()> {
        let now = Utc::now();
        let (mut product, version) = self.products.get_versioned(id)?;
        let price_changed = product.price() != price;
        product.set_price(price, now)?;
        self.products.save(product, ExpectedVersion::Exact(version))?;

        self.hooks.dispatch(&LifecycleEvent::ProductSaved {
            product_id: id,
            price_changed,
            occurred_at: now,
        })
    }

    // ---- line items ----

    /// Create a line item for a product. The product's current price is
    /// captured onto the item at this moment.
    pub fn create_line_item(
        &self,
        product_id: ProductId,
        quantity: Decimal,
    ) -> DomainResult<LineItemId> {
        let now = Utc::now();
        let product = self.products.get(product_id)?;

        let item = LineItem::new(
            LineItemId::new(RecordId::new()),
            product_id,
            product.price(),
            quantity,
            now,
        )?;
        let id = item.id();
        self.line_items.insert(item)?;

        self.hooks.dispatch(&LifecycleEvent::LineItemSaved {
            line_item_id: id,
            created: true,
            occurred_at: now,
        })?;
        Ok(id)
    }

    pub fn line_item(&self, id: LineItemId) -> DomainResult<LineItem> {
        self.line_items.get(id)
    }

    pub fn set_line_item_quantity(&self, id: LineItemId, quantity: Decimal) -> DomainResult<()> {
        self.mutate_line_item(id, |item, now| item.set_quantity(quantity, now))
    }

    pub fn delete_line_item(&self, id: LineItemId) -> DomainResult<()> {
        self.mutate_line_item(id, |item, now| {
            item.soft_delete(now);
            Ok(())
        })
    }

    pub fn restore_line_item(&self, id: LineItemId) -> DomainResult<()> {
        self.mutate_line_item(id, |item, now| {
            item.restore(now);
            Ok(())
        })
    }

    fn mutate_line_item<F>(&self, id: LineItemId, mutate: F) -> DomainResult<()>
    where
        F: FnOnce(&mut LineItem, chrono::DateTime<Utc>) -> DomainResult<()>,
    {
        let now = Utc::now();
        let (mut item, version) = self.line_items.get_versioned(id)?;
        mutate(&mut item, now)?;
        self.line_items.save(item, ExpectedVersion::Exact(version))?;

        self.hooks.dispatch(&LifecycleEvent::LineItemSaved {
            line_item_id: id,
            created: false,
            occurred_at: now,
        })
    }

    // ---- orders ----

    pub fn create_order(
        &self,
        customer_id: CustomerId,
        nick: &str,
        delivery_date: NaiveDate,
    ) -> DomainResult<OrderId> {
        if !self.customers.contains(customer_id)? {
            return Err(DomainError::NotFound);
        }
        let nick_trimmed = nick.trim();
        if !self.orders.find(|o| o.nick() == nick_trimmed)?.is_empty() {
            return Err(DomainError::conflict(format!(
                "order nick '{nick_trimmed}' is already taken"
            )));
        }

        let order = Order::new(
            OrderId::new(RecordId::new()),
            customer_id,
            nick,
            delivery_date,
            Utc::now(),
        )?;
        let id = order.id();
        self.orders.insert(order)?;
        Ok(id)
    }

    pub fn order(&self, id: OrderId) -> DomainResult<Order> {
        self.orders.get(id)
    }

    /// Put a line item on an order. A line item belongs to at most one order.
    pub fn add_item_to_order(&self, order_id: OrderId, item_id: LineItemId) -> DomainResult<()> {
        if !self.line_items.contains(item_id)? {
            return Err(DomainError::NotFound);
        }
        let owners = self.orders.find(|o| o.contains_item(item_id))?;
        if !owners.is_empty() {
            return Err(DomainError::conflict(format!(
                "line item {item_id} already belongs to an order"
            )));
        }

        let now = Utc::now();
        let (mut order, version) = self.orders.get_versioned(order_id)?;
        order.add_item(item_id, now)?;
        self.orders.save(order, ExpectedVersion::Exact(version))?;

        self.hooks.dispatch(&LifecycleEvent::OrderItemsChanged {
            order_id,
            occurred_at: now,
        })
    }

    pub fn remove_item_from_order(
        &self,
        order_id: OrderId,
        item_id: LineItemId,
    ) -> DomainResult<()> {
        let now = Utc::now();
        let (mut order, version) = self.orders.get_versioned(order_id)?;
        order.remove_item(item_id, now)?;
        self.orders.save(order, ExpectedVersion::Exact(version))?;

        self.hooks.dispatch(&LifecycleEvent::OrderItemsChanged {
            order_id,
            occurred_at: now,
        })
    }

    /// One-way: freezes the order's total at its current value.
    pub fn mark_delivered(&self, order_id: OrderId) -> DomainResult<()> {
        self.mutate_order(order_id, |order, now| order.mark_delivered(now))
    }

    pub fn set_payment_method(
        &self,
        order_id: OrderId,
        method: PaymentMethod,
    ) -> DomainResult<()> {
        self.mutate_order(order_id, |order, now| {
            order.set_payment_method(method, now);
            Ok(())
        })
    }

    pub fn record_payment(&self, order_id: OrderId, amount: Decimal) -> DomainResult<()> {
        self.mutate_order(order_id, |order, now| order.record_payment(amount, now))
    }

    pub fn set_service_fee(&self, order_id: OrderId, fee: Decimal) -> DomainResult<()> {
        self.mutate_order(order_id, |order, now| order.set_service_fee(fee, now))
    }

    pub fn set_order_notes(&self, order_id: OrderId, notes: Option<&str>) -> DomainResult<()> {
        self.mutate_order(order_id, |order, now| order.set_notes(notes, now))
    }

    pub fn set_order_instagram(
        &self,
        order_id: OrderId,
        username: Option<&str>,
    ) -> DomainResult<()> {
        self.mutate_order(order_id, |order, now| order.set_instagram(username, now))
    }

    /// Recompute an order's total on demand (the triggers normally keep it
    /// current; this exists for callers that changed configuration or need to
    /// repair a stale total after price propagation).
    pub fn recompute_order(&self, order_id: OrderId) -> DomainResult<()> {
        self.engine.recompute_order(order_id, Utc::now())
    }

    fn mutate_order<F>(&self, order_id: OrderId, mutate: F) -> DomainResult<()>
    where
        F: FnOnce(&mut Order, chrono::DateTime<Utc>) -> DomainResult<()>,
    {
        let now = Utc::now();
        let (mut order, version) = self.orders.get_versioned(order_id)?;
        mutate(&mut order, now)?;
        self.orders.save(order, ExpectedVersion::Exact(version))?;
        Ok(())
    }
}

impl Default for Backoffice {
    fn default() -> Self {
        Self::new()
    }
}
