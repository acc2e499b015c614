//! Per-slot record of the live instance occupying a matched slot.
//!
//! Transitions of one cell:
//!
//! ```text
//! unregistered ──register──► active(a) ──reuse(b)──► active(b)
//!      ▲                                                 │
//!      └───────────────unregister(b)─────────────────────┘
//! ```
//!
//! An unregister naming anything but the current occupant is a no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::fragment::InstanceId;

use super::{HookEvent, ViewHook};

const EMPTY: u64 = 0;

/// Shared cell holding the current instance of one slot.
#[derive(Debug, Clone, Default)]
pub struct InstanceCell {
    slot: Arc<AtomicU64>,
}

impl InstanceCell {
    /// Creates an unregistered cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current occupant.
    pub fn get(&self) -> Option<InstanceId> {
        InstanceId::new(self.slot.load(Ordering::Acquire))
    }

    /// Sets the cell to `id` unless it already holds it. Returns true on change.
    pub fn register(&self, id: InstanceId) -> bool {
        self.slot.swap(id.get(), Ordering::AcqRel) != id.get()
    }

    /// Clears the cell only if it holds `id`. Returns true on change.
    pub fn unregister(&self, id: InstanceId) -> bool {
        self.slot
            .compare_exchange(id.get(), EMPTY, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Points the cell at `id` unconditionally.
    pub fn replace(&self, id: InstanceId) -> Option<InstanceId> {
        InstanceId::new(self.slot.swap(id.get(), Ordering::AcqRel))
    }
}

/// Instance cells of one matched segment, keyed by slot name.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    cells: HashMap<String, InstanceCell>,
}

impl InstanceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures a cell exists for `slot`.
    pub fn add_slot(&mut self, slot: &str) {
        self.cells.entry(slot.to_string()).or_default();
    }

    /// Handle to the cell of `slot`.
    pub fn cell(&self, slot: &str) -> Option<InstanceCell> {
        self.cells.get(slot).cloned()
    }

    /// Instance currently registered in `slot`.
    pub fn get(&self, slot: &str) -> Option<InstanceId> {
        self.cells.get(slot).and_then(InstanceCell::get)
    }
}

/// Hook keeping a slot's cell pointed at the mounted instance.
#[derive(Debug, Clone)]
pub struct SlotRegistration {
    slot: String,
    cell: InstanceCell,
}

impl SlotRegistration {
    /// Creates the registration hook for `slot`.
    pub fn new(slot: impl Into<String>, cell: InstanceCell) -> Self {
        Self {
            slot: slot.into(),
            cell,
        }
    }
}

impl ViewHook for SlotRegistration {
    fn name(&self) -> &str {
        "slot_registration"
    }

    fn on_register(&self, vm: InstanceId, val: Option<InstanceId>) {
        let changed = match val {
            Some(instance) => self.cell.register(instance),
            None => self.cell.unregister(vm),
        };
        if changed {
            tracing::trace!(
                slot = %self.slot,
                event = %HookEvent::Register,
                vm = %vm,
                registered = val.is_some(),
                "Slot instance updated"
            );
        }
    }

    fn on_reuse(&self, instance: InstanceId) {
        self.cell.replace(instance);
    }

    fn on_create(&self, instance: InstanceId, keep_alive: bool) {
        if keep_alive && self.cell.get() != Some(instance) {
            self.cell.register(instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> InstanceId {
        InstanceId::new(raw).unwrap()
    }

    #[test]
    fn test_register_sets_once() {
        let cell = InstanceCell::new();
        assert!(cell.get().is_none());

        assert!(cell.register(id(1)));
        assert!(!cell.register(id(1)));
        assert_eq!(cell.get(), Some(id(1)));
    }

    #[test]
    fn test_unregister_requires_current_occupant() {
        let cell = InstanceCell::new();
        cell.register(id(1));
        cell.replace(id(2));

        // Late unregister from the superseded instance
        assert!(!cell.unregister(id(1)));
        assert_eq!(cell.get(), Some(id(2)));

        assert!(cell.unregister(id(2)));
        assert!(cell.get().is_none());
    }

    #[test]
    fn test_registry_cells_are_shared() {
        let mut registry = InstanceRegistry::new();
        registry.add_slot("default");
        registry.add_slot("default");

        let a = registry.cell("default").unwrap();
        let b = registry.cell("default").unwrap();
        assert!(registry.cell("sidebar").is_none());

        a.register(id(9));
        assert_eq!(b.get(), Some(id(9)));
        assert_eq!(registry.get("default"), Some(id(9)));
    }

    #[test]
    fn test_slot_registration_hook() {
        let cell = InstanceCell::new();
        let hook = SlotRegistration::new("default", cell.clone());

        hook.on_register(id(1), Some(id(1)));
        assert_eq!(cell.get(), Some(id(1)));

        hook.on_reuse(id(2));
        assert_eq!(cell.get(), Some(id(2)));

        hook.on_register(id(1), None);
        assert_eq!(cell.get(), Some(id(2)));

        hook.on_create(id(3), false);
        assert_eq!(cell.get(), Some(id(2)));

        hook.on_create(id(3), true);
        assert_eq!(cell.get(), Some(id(3)));

        hook.on_register(id(3), None);
        assert!(cell.get().is_none());
    }
}
