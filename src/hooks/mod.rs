//! Lifecycle hooks attached to rendered fragments.
//!
//! The renderer runs these at fixed points of an instance's life:
//!
//! - `on_register`: the instance registers (`Some`) or unregisters (`None`) itself
//! - `on_reuse`: an existing node with the same key is patched in place
//! - `on_create`: the renderer initializes a fragment (fresh or kept-alive)

mod builtin;
mod registry;

pub use builtin::{HookMetrics, LoggingHook, MetricsHook};
pub use registry::{InstanceCell, InstanceRegistry, SlotRegistration};

use std::fmt;
use std::sync::Arc;

use crate::types::fragment::InstanceId;

// ═══════════════════════════════════════════════════════════════════════════
// Hook events
// ═══════════════════════════════════════════════════════════════════════════

/// Point in the lifecycle that triggers a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    /// Instance registration or unregistration.
    Register,

    /// Same-key node patched in place.
    Reuse,

    /// Fragment initialized by the renderer.
    Create,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookEvent::Register => write!(f, "register"),
            HookEvent::Reuse => write!(f, "reuse"),
            HookEvent::Create => write!(f, "create"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ViewHook trait
// ═══════════════════════════════════════════════════════════════════════════

/// Hook object invoked by the renderer. Every operation defaults to a no-op.
pub trait ViewHook: Send + Sync {
    /// Hook name.
    fn name(&self) -> &str;

    /// `vm` registers itself with `val = Some(vm)` and unregisters with `None`.
    fn on_register(&self, vm: InstanceId, val: Option<InstanceId>) {
        let _ = (vm, val);
    }

    /// `instance` is the instance now mounted for a reused node.
    fn on_reuse(&self, instance: InstanceId) {
        let _ = instance;
    }

    /// The renderer initialized a fragment backed by `instance`.
    fn on_create(&self, instance: InstanceId, keep_alive: bool) {
        let _ = (instance, keep_alive);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Hook system
// ═══════════════════════════════════════════════════════════════════════════

/// Ordered set of hooks carried by a fragment.
#[derive(Clone, Default)]
pub struct HookSystem {
    hooks: Vec<Arc<dyn ViewHook>>,
}

impl HookSystem {
    /// Creates an empty hook system.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Registers a hook. Hooks run in registration order.
    pub fn register(&mut self, hook: Arc<dyn ViewHook>) {
        tracing::trace!(hook_name = hook.name(), "Attaching view hook");
        self.hooks.push(hook);
    }

    /// Builder form of [`HookSystem::register`].
    pub fn with(mut self, hook: Arc<dyn ViewHook>) -> Self {
        self.register(hook);
        self
    }

    /// Appends every hook of `other`.
    pub fn extend(&mut self, other: &HookSystem) {
        self.hooks.extend(other.hooks.iter().cloned());
    }

    /// Runs `on_register` hooks.
    pub fn run_register(&self, vm: InstanceId, val: Option<InstanceId>) {
        for hook in &self.hooks {
            hook.on_register(vm, val);
        }
    }

    /// Runs `on_reuse` hooks.
    pub fn run_reuse(&self, instance: InstanceId) {
        for hook in &self.hooks {
            hook.on_reuse(instance);
        }
    }

    /// Runs `on_create` hooks.
    pub fn run_create(&self, instance: InstanceId, keep_alive: bool) {
        for hook in &self.hooks {
            hook.on_create(instance, keep_alive);
        }
    }

    /// Number of attached hooks.
    pub fn count(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no hook is attached.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.hooks.iter().map(|hook| hook.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Counts every invocation regardless of event
    struct CountingHook {
        count: Arc<AtomicUsize>,
    }

    impl ViewHook for CountingHook {
        fn name(&self) -> &str {
            "counting"
        }

        fn on_register(&self, _vm: InstanceId, _val: Option<InstanceId>) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }

        fn on_reuse(&self, _instance: InstanceId) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn id(raw: u64) -> InstanceId {
        InstanceId::new(raw).unwrap()
    }

    #[test]
    fn test_hook_system_new() {
        let system = HookSystem::new();
        assert_eq!(system.count(), 0);
        assert!(system.is_empty());
    }

    #[test]
    fn test_hooks_run_in_order_for_each_event() {
        let count = Arc::new(AtomicUsize::new(0));
        let system = HookSystem::new()
            .with(Arc::new(CountingHook { count: count.clone() }))
            .with(Arc::new(CountingHook { count: count.clone() }));

        system.run_register(id(1), Some(id(1)));
        assert_eq!(count.load(Ordering::SeqCst), 2);

        system.run_reuse(id(1));
        assert_eq!(count.load(Ordering::SeqCst), 4);

        // on_create keeps the default no-op
        system.run_create(id(1), true);
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_extend_and_debug() {
        let mut system = HookSystem::new().with(Arc::new(LoggingHook::new()));
        let other = HookSystem::new().with(Arc::new(MetricsHook::new()));
        system.extend(&other);

        assert_eq!(system.count(), 2);
        assert_eq!(format!("{:?}", system), "[\"logging\", \"metrics\"]");
    }

    #[test]
    fn test_hook_event_display() {
        assert_eq!(format!("{}", HookEvent::Register), "register");
        assert_eq!(format!("{}", HookEvent::Reuse), "reuse");
        assert_eq!(format!("{}", HookEvent::Create), "create");
    }
}
