use orderdesk_core::DomainResult;

use crate::Event;

/// A synchronous observer of lifecycle events.
///
/// Hooks run on the caller's thread as part of the triggering mutation. A hook
/// error surfaces to the caller of that mutation, so implementations should
/// only fail for genuine domain problems and otherwise log and carry on.
pub trait Hook<E: Event>: Send + Sync {
    /// Short name used in logs when this hook runs or fails.
    fn name(&self) -> &'static str;

    fn on_event(&self, event: &E) -> DomainResult<()>;
}
