use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, RecordId};

use crate::category::CategoryId;

const MAX_NAME_LEN: usize = 70;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub RecordId);

impl ProductId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Unit a product is distributed in. Liter and kilogram units make fractional
/// quantities legal on line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionUnit {
    Piece,
    Liter,
    Kilogram,
    Coil,
}

/// A catalog product with its current sale price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    category_id: CategoryId,
    name: String,
    unit: DistributionUnit,
    price: Decimal,
    purchase_price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        category_id: CategoryId,
        name: &str,
        unit: DistributionUnit,
        price: Decimal,
        purchase_price: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "product name cannot exceed {MAX_NAME_LEN} characters"
            )));
        }
        check_price(price)?;
        check_price(purchase_price)?;

        Ok(Self {
            id,
            category_id,
            name: name.to_string(),
            unit,
            price,
            purchase_price,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> DistributionUnit {
        self.unit
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn purchase_price(&self) -> Decimal {
        self.purchase_price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Change the current sale price.
    ///
    /// The store layer is responsible for propagating the new price into line
    /// items that reference this product.
    pub fn set_price(&mut self, price: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        check_price(price)?;
        self.price = price;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_purchase_price(&mut self, price: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        check_price(price)?;
        self.purchase_price = price;
        self.updated_at = now;
        Ok(())
    }
}

fn check_price(price: Decimal) -> DomainResult<()> {
    if price < Decimal::ZERO {
        return Err(DomainError::validation("price cannot be negative"));
    }
    Ok(())
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

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

    #[test]
    fn set_price_updates_price_and_timestamp() {
        let mut p = product(dec!(100));
        let before = p.updated_at();

        let later = before + chrono::Duration::seconds(1);
        p.set_price(dec!(120.50), later).unwrap();

        assert_eq!(p.price(), dec!(120.50));
        assert_eq!(p.updated_at(), later);
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut p = product(dec!(100));
        let err = p.set_price(dec!(-1), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(p.price(), dec!(100));
    }

    #[test]
    fn zero_price_is_allowed() {
        // Freebies and samples exist.
        let p = product(dec!(0));
        assert_eq!(p.price(), Decimal::ZERO);
    }
}
