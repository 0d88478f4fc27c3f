//! `orderdesk-store` — in-memory persistence and lifecycle wiring.
//!
//! This crate stands in for the CRUD/API layer that would normally front the
//! domain: it persists records, and its save path emits lifecycle events that the
//! registered hooks consume synchronously. The only hook shipped here is the
//! [`engine::TotalsEngine`], which maintains order totals and propagates
//! product price changes.

pub mod backoffice;
pub mod engine;
pub mod hooks;
pub mod memory;
pub mod telemetry;

pub use backoffice::Backoffice;
pub use engine::{TotalsConfig, TotalsEngine};
pub use hooks::LifecycleEvent;
pub use memory::InMemoryTable;
