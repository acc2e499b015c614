//! Scroll position memory for cached views.
//!
//! Restoring and resolving targets must wait until the renderer has applied
//! the current update, so both are queued as [`ScrollTask`]s and run by
//! [`ScrollManager::run`] once the render settles. Each task remembers the
//! generation of the entry it was scheduled for and does nothing if that
//! entry has been evicted or replaced in the meantime.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntry, CacheKey, ViewCache};
use crate::engine::RenderEngine;

/// Scroll offset of an element, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    /// Creates an offset.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vertical-only offset.
    pub fn vertical(y: f64) -> Self {
        Self { x: 0.0, y }
    }
}

/// Deferred scroll work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTask {
    /// Look up the scroll target of a freshly mounted instance.
    ResolveTarget { key: CacheKey, generation: u64 },

    /// Scroll a reused entry back to its saved offset.
    Restore { key: CacheKey, generation: u64 },
}

/// Outcome of one settle pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettleReport {
    /// Targets resolved.
    pub resolved: usize,

    /// Offsets restored.
    pub restored: usize,

    /// Tasks whose entry was gone or whose target was stale.
    pub skipped: usize,

    /// Detached instances destroyed after the render settled.
    pub destroyed: usize,
}

/// Queue of deferred scroll tasks for one view.
#[derive(Debug, Default)]
pub struct ScrollManager {
    pending: VecDeque<ScrollTask>,
}

impl ScrollManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules resolution of the scroll target of a new entry.
    pub fn schedule_resolve(&mut self, key: CacheKey, generation: u64) {
        tracing::trace!(key = %key, "Scheduling scroll target resolution");
        self.pending.push_back(ScrollTask::ResolveTarget { key, generation });
    }

    /// Schedules a restore for a reused entry.
    pub fn schedule_restore(&mut self, key: CacheKey, generation: u64) {
        tracing::trace!(key = %key, "Scheduling scroll restore");
        self.pending.push_back(ScrollTask::Restore { key, generation });
    }

    /// Captures the current offset of `entry` into its saved value.
    ///
    /// Returns false when the entry has no target or the target is stale.
    pub fn capture<E: RenderEngine>(
        engine: &E,
        entry: &mut CacheEntry<E::Instance, E::ScrollTarget>,
    ) -> bool {
        let Some(target) = Self::target(engine, entry) else {
            return false;
        };
        match engine.scroll_offset(target) {
            Some(offset) => {
                entry.saved_scroll = Some(offset);
                true
            }
            None => false,
        }
    }

    /// Runs every pending task in scheduling order.
    pub fn run<E: RenderEngine>(
        &mut self,
        cache: &mut ViewCache<E::Instance, E::ScrollTarget>,
        engine: &mut E,
    ) -> SettleReport {
        let mut report = SettleReport::default();

        while let Some(task) = self.pending.pop_front() {
            match task {
                ScrollTask::ResolveTarget { key, generation } => {
                    match cache.live_entry(key.as_str(), generation) {
                        Some(entry) => {
                            entry.scroll_target = engine.scroll_target(&entry.instance);
                            report.resolved += 1;
                        }
                        None => report.skipped += 1,
                    }
                }
                ScrollTask::Restore { key, generation } => {
                    let Some(entry) = cache.live_entry(key.as_str(), generation) else {
                        report.skipped += 1;
                        continue;
                    };
                    let Some(offset) = entry.saved_scroll else {
                        continue;
                    };
                    let Some(target) = Self::target(&*engine, entry) else {
                        continue;
                    };
                    if engine.scroll_to(target, offset) {
                        entry.saved_scroll = None;
                        report.restored += 1;
                        tracing::debug!(key = %key, y = offset.y, "Scroll position restored");
                    } else {
                        report.skipped += 1;
                    }
                }
            }
        }

        report
    }

    // Cached target of `entry`, looked up again while the engine has none.
    fn target<'a, E: RenderEngine>(
        engine: &E,
        entry: &'a mut CacheEntry<E::Instance, E::ScrollTarget>,
    ) -> Option<&'a E::ScrollTarget> {
        if entry.scroll_target.is_none() {
            entry.scroll_target = engine.scroll_target(&entry.instance);
        }
        entry.scroll_target.as_ref()
    }

    /// Number of tasks waiting for the next settle.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ComponentInstance, HeadlessEngine};
    use crate::types::fragment::Fragment;
    use crate::types::route::{ComponentDef, ComponentId, PropMap};
    use std::sync::Arc;

    fn key(name: &str) -> CacheKey {
        CacheKey::compose(Some(name), ComponentId(1), &PropMap::new())
    }

    fn mount(engine: &mut HeadlessEngine) -> <HeadlessEngine as RenderEngine>::Instance {
        let fragment = Fragment::component(
            Arc::new(ComponentDef::new(1, "Page")),
            Default::default(),
            vec![],
        );
        engine.instantiate(&fragment)
    }

    #[test]
    fn test_resolve_then_restore() {
        let mut engine = HeadlessEngine::new();
        let mut cache = ViewCache::new(0);
        let mut scroll = ScrollManager::new();

        let instance = mount(&mut engine);
        let id = instance.id();
        cache.insert(key("a"), instance, None).unwrap();
        let generation = cache.peek(key("a").as_str()).unwrap().generation();

        scroll.schedule_resolve(key("a"), generation);
        let report = scroll.run(&mut cache, &mut engine);
        assert_eq!(report.resolved, 1);
        assert!(cache.peek(key("a").as_str()).unwrap().scroll_target.is_some());

        engine.set_scroll(id, ScrollOffset::vertical(120.0));
        let entry = cache.peek_mut(key("a").as_str()).unwrap();
        assert!(ScrollManager::capture(&engine, entry));
        engine.set_scroll(id, ScrollOffset::default());

        scroll.schedule_restore(key("a"), generation);
        assert_eq!(scroll.pending(), 1);
        let report = scroll.run(&mut cache, &mut engine);

        assert_eq!(report.restored, 1);
        assert_eq!(engine.scroll_of(id), Some(ScrollOffset::vertical(120.0)));
        assert!(cache.peek(key("a").as_str()).unwrap().saved_scroll.is_none());
    }

    #[test]
    fn test_evicted_entry_is_skipped() {
        let mut engine = HeadlessEngine::new();
        let mut cache = ViewCache::new(0);
        let mut scroll = ScrollManager::new();

        let instance = mount(&mut engine);
        cache.insert(key("a"), instance, None).unwrap();
        let generation = cache.peek(key("a").as_str()).unwrap().generation();
        scroll.schedule_resolve(key("a"), generation);

        for (_, entry) in cache.evict_all() {
            engine.destroy(entry.instance);
        }

        let report = scroll.run(&mut cache, &mut engine);
        assert_eq!(report.resolved, 0);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_stale_target_is_skipped() {
        let mut engine = HeadlessEngine::new();
        let mut cache = ViewCache::new(0);
        let mut scroll = ScrollManager::new();

        let instance = mount(&mut engine);
        let id = instance.id();
        cache.insert(key("a"), instance, None).unwrap();
        let generation = cache.peek(key("a").as_str()).unwrap().generation();

        let entry = cache.peek_mut(key("a").as_str()).unwrap();
        entry.scroll_target = engine.scroll_target(&entry.instance);
        entry.saved_scroll = Some(ScrollOffset::vertical(40.0));

        engine.detach_scroll_target(id);
        scroll.schedule_restore(key("a"), generation);
        let report = scroll.run(&mut cache, &mut engine);

        assert_eq!(report.restored, 0);
        assert_eq!(report.skipped, 1);
        // Saved offset survives a stale target
        assert_eq!(
            cache.peek(key("a").as_str()).unwrap().saved_scroll,
            Some(ScrollOffset::vertical(40.0))
        );
    }

    #[test]
    fn test_late_target_is_resolved_on_capture() {
        let mut engine = HeadlessEngine::new();
        let mut cache = ViewCache::new(0);
        let mut scroll = ScrollManager::new();

        let instance = mount(&mut engine);
        let id = instance.id();
        engine.detach_scroll_target(id);
        cache.insert(key("a"), instance, None).unwrap();
        let generation = cache.peek(key("a").as_str()).unwrap().generation();

        // Container not mounted yet when the render settles
        scroll.schedule_resolve(key("a"), generation);
        scroll.run(&mut cache, &mut engine);
        assert!(cache.peek(key("a").as_str()).unwrap().scroll_target.is_none());

        engine.attach_scroll_target(id);
        engine.set_scroll(id, ScrollOffset::vertical(75.0));
        let entry = cache.peek_mut(key("a").as_str()).unwrap();
        assert!(ScrollManager::capture(&engine, entry));
        assert!(entry.scroll_target.is_some());
        assert_eq!(entry.saved_scroll, Some(ScrollOffset::vertical(75.0)));

        engine.set_scroll(id, ScrollOffset::default());
        scroll.schedule_restore(key("a"), generation);
        let report = scroll.run(&mut cache, &mut engine);
        assert_eq!(report.restored, 1);
        assert_eq!(engine.scroll_of(id), Some(ScrollOffset::vertical(75.0)));
    }

    #[test]
    fn test_late_target_is_resolved_on_restore() {
        let mut engine = HeadlessEngine::new();
        let mut cache = ViewCache::new(0);
        let mut scroll = ScrollManager::new();

        let instance = mount(&mut engine);
        let id = instance.id();
        engine.detach_scroll_target(id);
        cache.insert(key("a"), instance, None).unwrap();
        let generation = cache.peek(key("a").as_str()).unwrap().generation();

        scroll.schedule_resolve(key("a"), generation);
        scroll.run(&mut cache, &mut engine);

        let entry = cache.peek_mut(key("a").as_str()).unwrap();
        entry.saved_scroll = Some(ScrollOffset::vertical(30.0));

        // Still missing: nothing to restore yet, offset kept
        scroll.schedule_restore(key("a"), generation);
        let report = scroll.run(&mut cache, &mut engine);
        assert_eq!(report.restored, 0);
        assert_eq!(
            cache.peek(key("a").as_str()).unwrap().saved_scroll,
            Some(ScrollOffset::vertical(30.0))
        );

        engine.attach_scroll_target(id);
        scroll.schedule_restore(key("a"), generation);
        let report = scroll.run(&mut cache, &mut engine);
        assert_eq!(report.restored, 1);
        assert_eq!(engine.scroll_of(id), Some(ScrollOffset::vertical(30.0)));
        assert!(cache.peek(key("a").as_str()).unwrap().scroll_target.is_some());
    }

    #[test]
    fn test_capture_without_target() {
        let mut engine = HeadlessEngine::new();
        let mut cache: ViewCache<_, <HeadlessEngine as RenderEngine>::ScrollTarget> = ViewCache::new(0);

        let instance = mount(&mut engine);
        engine.detach_scroll_target(instance.id());
        cache.insert(key("a"), instance, None).unwrap();
        let entry = cache.peek_mut(key("a").as_str()).unwrap();

        assert!(!ScrollManager::capture(&engine, entry));
        assert!(entry.scroll_target.is_none());
        assert!(entry.saved_scroll.is_none());
    }
}
