//! Observer registry for weak actor associations.

use std::collections::HashMap;

use actorsim_core::{ActorId, RefSlot};

/// Records, per referenced actor, which holders point at it and through which
/// slot, so teardown can clear exactly those fields.
#[derive(Clone, Debug, Default)]
pub(crate) struct WeakRefs {
    observers: HashMap<ActorId, Vec<(ActorId, RefSlot)>>,
}

impl WeakRefs {
    pub(crate) fn register(&mut self, holder: ActorId, slot: RefSlot, target: ActorId) {
        let holders = self.observers.entry(target).or_default();
        if !holders.contains(&(holder, slot)) {
            holders.push((holder, slot));
        }
    }

    pub(crate) fn unregister(&mut self, holder: ActorId, slot: RefSlot, target: ActorId) {
        if let Some(holders) = self.observers.get_mut(&target) {
            holders.retain(|entry| *entry != (holder, slot));
            if holders.is_empty() {
                let _ = self.observers.remove(&target);
            }
        }
    }

    /// Removes and returns every holder of `target`.
    pub(crate) fn take_holders(&mut self, target: ActorId) -> Vec<(ActorId, RefSlot)> {
        self.observers.remove(&target).unwrap_or_default()
    }
}
