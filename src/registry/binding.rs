//! Dynamic binding of the registry handle.
//!
//! # State Transitions
//! ```text
//! Unbound → Bound:   Added(r) while nothing is bound
//! Bound   → Unbound: Removed(r) where r is the bound handle
//! ```
//!
//! Other events are ignored: a second registry appearing while one is bound
//! does not replace it, and removal of a registry that is not bound is a no-op.
//!
//! # Design Decisions
//! - Operations hold the read lock for their whole run, so a swap waits
//!   for in-flight calls and never lands mid-operation
//! - Lock poisoning is recovered; the slot holds no invariant a panic can break

use std::sync::{Arc, PoisonError, RwLock};

use crate::registry::ConfigurationRegistry;

/// Availability change of a registry backend.
#[derive(Clone)]
pub enum RegistryEvent {
    Added(Arc<dyn ConfigurationRegistry>),
    Removed(Arc<dyn ConfigurationRegistry>),
}

/// Holder of the currently bound registry, if any.
#[derive(Default)]
pub struct RegistryBinding {
    slot: RwLock<Option<Arc<dyn ConfigurationRegistry>>>,
}

impl RegistryBinding {
    /// Create an unbound binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a binding with `registry` already bound.
    pub fn bound(registry: Arc<dyn ConfigurationRegistry>) -> Self {
        Self {
            slot: RwLock::new(Some(registry)),
        }
    }

    /// Apply an availability event. Returns whether the binding changed.
    pub fn handle(&self, event: RegistryEvent) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        match event {
            RegistryEvent::Added(registry) => {
                if slot.is_some() {
                    tracing::debug!("Registry already bound, ignoring additional registry");
                    return false;
                }
                *slot = Some(registry);
                tracing::info!("Configuration registry bound");
                true
            }
            RegistryEvent::Removed(registry) => match slot.as_ref() {
                Some(current) if Arc::ptr_eq(current, &registry) => {
                    *slot = None;
                    tracing::info!("Configuration registry unbound");
                    true
                }
                _ => false,
            },
        }
    }

    pub fn is_bound(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Run `f` against the bound registry while holding the binding stable.
    ///
    /// Returns `None` when no registry is bound at call time.
    pub fn with_registry<R>(&self, f: impl FnOnce(&dyn ConfigurationRegistry) -> R) -> Option<R> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|registry| f(&**registry))
    }
}
