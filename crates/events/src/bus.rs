//! Synchronous hook registry.
//!
//! The bus fans a lifecycle event out to every registered hook, in
//! registration order, on the caller's thread. Dispatch stops at the first
//! hook error and returns it, so the caller of the triggering mutation sees
//! the failure directly.

use std::sync::{Arc, RwLock};

use orderdesk_core::{DomainError, DomainResult};

use crate::{Event, Hook};

/// Registry of synchronous hooks for one event type.
pub struct HookBus<E: Event> {
    hooks: RwLock<Vec<Arc<dyn Hook<E>>>>,
}

impl<E: Event> HookBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bus with an initial set of hooks.
    pub fn with_hooks(hooks: Vec<Arc<dyn Hook<E>>>) -> Self {
        Self {
            hooks: RwLock::new(hooks),
        }
    }

    pub fn register(&self, hook: Arc<dyn Hook<E>>) -> DomainResult<()> {
        let mut hooks = self
            .hooks
            .write()
            .map_err(|_| DomainError::invariant("hook registry lock poisoned"))?;
        hooks.push(hook);
        Ok(())
    }

    /// Dispatch an event to every registered hook.
    ///
    /// Hooks run in registration order; the first error aborts dispatch.
    pub fn dispatch(&self, event: &E) -> DomainResult<()> {
        let hooks = self
            .hooks
            .read()
            .map_err(|_| DomainError::invariant("hook registry lock poisoned"))?;

        for hook in hooks.iter() {
            tracing::debug!(hook = hook.name(), event = event.event_type(), "dispatch");
            hook.on_event(event).inspect_err(|e| {
                tracing::warn!(
                    hook = hook.name(),
                    event = event.event_type(),
                    error = %e,
                    "hook failed"
                );
            })?;
        }

        Ok(())
    }
}

impl<E: Event> Default for HookBus<E> {
    fn default() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Event> core::fmt::Debug for HookBus<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let count = self.hooks.read().map(|h| h.len()).unwrap_or(0);
        f.debug_struct("HookBus").field("hooks", &count).finish()
    }
}
