//! `orderdesk-events` — lifecycle events and synchronous hook dispatch.
//!
//! The persistence layer emits a lifecycle event after each committed
//! mutation; registered hooks run synchronously, in registration order, on the
//! caller's thread. There is no process-global signal registry: whoever owns
//! the bus decides what is wired to it.

pub mod bus;
pub mod event;
pub mod hook;

pub use bus::HookBus;
pub use event::Event;
pub use hook::Hook;
