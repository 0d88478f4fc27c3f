//! Customer records: a user reference plus shipping address and phones.

pub mod customer;

pub use customer::{Customer, CustomerId};
