//! Product catalog: categories and products.
//!
//! Products carry the current sale price; line items snapshot it at creation
//! and the store layer propagates later price changes (see `orderdesk-store`).

pub mod category;
pub mod product;

pub use category::{Category, CategoryId};
pub use product::{DistributionUnit, Product, ProductId};
