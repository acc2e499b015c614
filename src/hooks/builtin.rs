//! Built-in view hooks.
//!
//! - `LoggingHook`: emits lifecycle events through `tracing`
//! - `MetricsHook`: counts lifecycle events

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::types::fragment::InstanceId;

use super::{HookEvent, ViewHook};

// ═══════════════════════════════════════════════════════════════════════════
// LoggingHook
// ═══════════════════════════════════════════════════════════════════════════

/// Hook that logs every lifecycle event at debug level.
#[derive(Debug, Default)]
pub struct LoggingHook;

impl LoggingHook {
    /// Creates a new LoggingHook.
    pub fn new() -> Self {
        Self
    }
}

impl ViewHook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_register(&self, vm: InstanceId, val: Option<InstanceId>) {
        tracing::debug!(
            event = %HookEvent::Register,
            vm = %vm,
            registered = val.is_some(),
            "Instance registration"
        );
    }

    fn on_reuse(&self, instance: InstanceId) {
        tracing::debug!(event = %HookEvent::Reuse, instance = %instance, "Instance reused");
    }

    fn on_create(&self, instance: InstanceId, keep_alive: bool) {
        tracing::debug!(
            event = %HookEvent::Create,
            instance = %instance,
            keep_alive,
            "Fragment created"
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MetricsHook
// ═══════════════════════════════════════════════════════════════════════════

/// Hook that counts lifecycle events.
#[derive(Debug, Default)]
pub struct MetricsHook {
    registrations: AtomicU64,
    unregistrations: AtomicU64,
    reuses: AtomicU64,
    creations: AtomicU64,
}

impl MetricsHook {
    /// Creates a new MetricsHook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events seen for `event`. Registrations and unregistrations
    /// both count as [`HookEvent::Register`].
    pub fn count(&self, event: HookEvent) -> u64 {
        match event {
            HookEvent::Register => {
                self.registrations.load(Ordering::Relaxed)
                    + self.unregistrations.load(Ordering::Relaxed)
            }
            HookEvent::Reuse => self.reuses.load(Ordering::Relaxed),
            HookEvent::Create => self.creations.load(Ordering::Relaxed),
        }
    }

    /// Snapshot of all counters.
    pub fn metrics(&self) -> HookMetrics {
        HookMetrics {
            registrations: self.registrations.load(Ordering::Relaxed),
            unregistrations: self.unregistrations.load(Ordering::Relaxed),
            reuses: self.reuses.load(Ordering::Relaxed),
            creations: self.creations.load(Ordering::Relaxed),
        }
    }
}

/// Counters collected by MetricsHook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HookMetrics {
    pub registrations: u64,
    pub unregistrations: u64,
    pub reuses: u64,
    pub creations: u64,
}

impl ViewHook for MetricsHook {
    fn name(&self) -> &str {
        "metrics"
    }

    fn on_register(&self, _vm: InstanceId, val: Option<InstanceId>) {
        if val.is_some() {
            self.registrations.fetch_add(1, Ordering::Relaxed);
        } else {
            self.unregistrations.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn on_reuse(&self, _instance: InstanceId) {
        self.reuses.fetch_add(1, Ordering::Relaxed);
    }

    fn on_create(&self, _instance: InstanceId, _keep_alive: bool) {
        self.creations.fetch_add(1, Ordering::Relaxed);
    }
}
