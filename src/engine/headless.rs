//! In-memory rendering engine.
//!
//! Keeps just enough state to drive a view without a real UI: live
//! instances, their scroll offsets, and the fragment currently mounted.
//! [`HeadlessEngine::commit`] runs fragment hooks the way a renderer would.

use std::collections::HashMap;

use crate::hooks::HookSystem;
use crate::scroll::ScrollOffset;
use crate::types::fragment::{Fragment, InstanceId};

use super::{ComponentInstance, RenderEngine};

/// Instance owned by a [`HeadlessEngine`].
#[derive(Debug, PartialEq, Eq)]
pub struct HeadlessInstance {
    id: InstanceId,
}

impl ComponentInstance for HeadlessInstance {
    fn id(&self) -> InstanceId {
        self.id
    }
}

/// Weak handle to the scroll container of a headless instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollHandle(InstanceId);

#[derive(Debug)]
struct LiveInstance {
    hooks: HookSystem,
    scroll: ScrollOffset,
    scrollable: bool,
    mounted_once: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Mounted {
    key: Option<String>,
    instance: Option<InstanceId>,
}

/// Rendering engine that keeps everything in memory.
#[derive(Debug, Default)]
pub struct HeadlessEngine {
    next_id: u64,
    live: HashMap<InstanceId, LiveInstance>,
    destroyed: Vec<InstanceId>,
    mounted: Option<Mounted>,
    settle_requests: usize,
}

impl HeadlessEngine {
    /// Creates an engine with no instances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts `fragment`, running its hooks.
    ///
    /// - same key and instance as the mounted fragment: `on_reuse`
    /// - first mount of an instance: `on_register(id, Some(id))` then `on_create`
    /// - cached instance mounted again: `on_create`
    pub fn commit(&mut self, fragment: &Fragment) {
        let Some(id) = fragment.instance else {
            self.mounted = Some(Mounted {
                key: fragment.key.clone(),
                instance: None,
            });
            return;
        };

        let next = Mounted {
            key: fragment.key.clone(),
            instance: Some(id),
        };
        let same_node = self.mounted.as_ref() == Some(&next);

        if let Some(live) = self.live.get_mut(&id) {
            if !fragment.hooks.is_empty() {
                live.hooks = fragment.hooks.clone();
            }
            if same_node {
                fragment.hooks.run_reuse(id);
            } else if !live.mounted_once {
                live.mounted_once = true;
                fragment.hooks.run_register(id, Some(id));
                fragment.hooks.run_create(id, fragment.data.keep_alive);
            } else {
                fragment.hooks.run_create(id, fragment.data.keep_alive);
            }
        } else {
            tracing::warn!(instance = %id, "Commit of unknown instance ignored");
        }

        self.mounted = Some(next);
    }

    /// Instance currently on screen.
    pub fn mounted_instance(&self) -> Option<InstanceId> {
        self.mounted.as_ref().and_then(|m| m.instance)
    }

    /// Key of the fragment currently on screen.
    pub fn mounted_key(&self) -> Option<&str> {
        self.mounted.as_ref().and_then(|m| m.key.as_deref())
    }

    /// Returns true if `id` has not been destroyed.
    pub fn is_live(&self, id: InstanceId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of live instances.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Destroyed instances, in destruction order.
    pub fn destroyed(&self) -> &[InstanceId] {
        &self.destroyed
    }

    /// Simulates the user scrolling an instance.
    pub fn set_scroll(&mut self, id: InstanceId, offset: ScrollOffset) {
        if let Some(live) = self.live.get_mut(&id) {
            live.scroll = offset;
        }
    }

    /// Current scroll offset of an instance.
    pub fn scroll_of(&self, id: InstanceId) -> Option<ScrollOffset> {
        self.live.get(&id).map(|live| live.scroll)
    }

    /// Removes the scroll container of an instance, making handles stale.
    pub fn detach_scroll_target(&mut self, id: InstanceId) {
        if let Some(live) = self.live.get_mut(&id) {
            live.scrollable = false;
        }
    }

    /// Gives an instance its scroll container back, or for the first time.
    pub fn attach_scroll_target(&mut self, id: InstanceId) {
        if let Some(live) = self.live.get_mut(&id) {
            live.scrollable = true;
        }
    }

    /// Number of settle callbacks requested so far.
    pub fn settle_requests(&self) -> usize {
        self.settle_requests
    }
}

impl RenderEngine for HeadlessEngine {
    type Instance = HeadlessInstance;
    type ScrollTarget = ScrollHandle;

    fn instantiate(&mut self, fragment: &Fragment) -> HeadlessInstance {
        let id = InstanceId::after(self.next_id);
        self.next_id = id.get();
        let component = fragment
            .component
            .as_ref()
            .map_or("empty", |component| component.name.as_str());

        tracing::debug!(instance = %id, component, "Instance created");
        self.live.insert(
            id,
            LiveInstance {
                hooks: fragment.hooks.clone(),
                scroll: ScrollOffset::default(),
                scrollable: true,
                mounted_once: false,
            },
        );
        HeadlessInstance { id }
    }

    fn destroy(&mut self, instance: HeadlessInstance) {
        let id = instance.id;
        if let Some(live) = self.live.remove(&id) {
            live.hooks.run_register(id, None);
            self.destroyed.push(id);
            tracing::debug!(instance = %id, "Instance destroyed");
        }
        if self.mounted_instance() == Some(id) {
            self.mounted = None;
        }
    }

    fn scroll_target(&self, instance: &HeadlessInstance) -> Option<ScrollHandle> {
        self.live
            .get(&instance.id)
            .filter(|live| live.scrollable)
            .map(|_| ScrollHandle(instance.id))
    }

    fn scroll_offset(&self, target: &ScrollHandle) -> Option<ScrollOffset> {
        self.live
            .get(&target.0)
            .filter(|live| live.scrollable)
            .map(|live| live.scroll)
    }

    fn scroll_to(&mut self, target: &ScrollHandle, offset: ScrollOffset) -> bool {
        match self.live.get_mut(&target.0) {
            Some(live) if live.scrollable => {
                live.scroll = offset;
                true
            }
            _ => false,
        }
    }

    fn request_settle(&mut self) {
        self.settle_requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{InstanceCell, SlotRegistration};
    use crate::types::fragment::ViewData;
    use crate::types::route::ComponentDef;
    use std::sync::Arc;

    fn fragment(cell: &InstanceCell, key: &str) -> Fragment {
        let mut fragment = Fragment::component(
            Arc::new(ComponentDef::new(1, "Page")),
            ViewData {
                keep_alive: true,
                ..Default::default()
            },
            vec![],
        );
        fragment.key = Some(key.to_string());
        fragment.hooks = HookSystem::new().with(Arc::new(SlotRegistration::new("default", cell.clone())));
        fragment
    }

    #[test]
    fn test_commit_registers_and_destroy_unregisters() {
        let mut engine = HeadlessEngine::new();
        let cell = InstanceCell::new();
        let mut frag = fragment(&cell, "arv::a");

        let instance = engine.instantiate(&frag);
        let id = instance.id();
        frag.instance = Some(id);
        engine.commit(&frag);

        assert_eq!(cell.get(), Some(id));
        assert_eq!(engine.mounted_instance(), Some(id));
        assert_eq!(engine.mounted_key(), Some("arv::a"));

        engine.destroy(instance);
        assert!(cell.get().is_none());
        assert!(!engine.is_live(id));
        assert_eq!(engine.destroyed(), &[id]);
        assert!(engine.mounted_instance().is_none());
    }

    #[test]
    fn test_scroll_handles_go_stale() {
        let mut engine = HeadlessEngine::new();
        let cell = InstanceCell::new();
        let instance = engine.instantiate(&fragment(&cell, "arv::a"));
        let handle = engine.scroll_target(&instance).unwrap();

        assert!(engine.scroll_to(&handle, ScrollOffset::vertical(10.0)));
        assert_eq!(engine.scroll_offset(&handle), Some(ScrollOffset::vertical(10.0)));

        engine.destroy(instance);
        assert!(engine.scroll_offset(&handle).is_none());
        assert!(!engine.scroll_to(&handle, ScrollOffset::default()));
    }
}
