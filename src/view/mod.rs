//! The view slot.
//!
//! A [`RouterView`] renders whichever component the current route matches at
//! its nesting depth and keeps previously rendered instances alive in a
//! [`ViewCache`]. One render goes through these steps, in order:
//!
//! 1. resolve depth and activity from the ancestor chain
//! 2. pick the matched segment at that depth
//! 3. resolve props and compose the cache key
//! 4. capture the scroll offset of the outgoing entry
//! 5. probe the cache, or instantiate, insert and evict
//! 6. schedule scroll restore or target resolution for the next settle

mod depth;
mod props;

pub use depth::{resolve_placement, Ancestor, Placement};
pub use props::{resolve_props, split_props, ResolvedProps};

use std::sync::Arc;

use crate::cache::{CacheKey, CacheStats, DuplicateKey, Eviction, ViewCache};
use crate::engine::{ComponentInstance, RenderEngine};
use crate::hooks::{HookSystem, SlotRegistration, ViewHook};
use crate::scroll::{ScrollManager, ScrollOffset, SettleReport};
use crate::types::config::{Config, ViewConfig};
use crate::types::fragment::{Fragment, InstanceId, ViewData};
use crate::types::route::{ComponentDef, PropMap, Route};
use crate::RouteViewError;

/// Inputs of one render call.
#[derive(Debug)]
pub struct RenderContext<'a> {
    /// Current route.
    pub route: &'a Route,

    /// Ancestors of the view, nearest first.
    pub ancestors: &'a [Ancestor],

    /// State key of the current history entry.
    pub history_key: Option<&'a str>,

    /// Slot content forwarded to the rendered component.
    pub children: Vec<Fragment>,
}

impl<'a> RenderContext<'a> {
    /// Context for a top-level view with no history key.
    pub fn new(route: &'a Route) -> Self {
        Self {
            route,
            ancestors: &[],
            history_key: None,
            children: Vec::new(),
        }
    }

    /// Sets the ancestor chain.
    pub fn with_ancestors(mut self, ancestors: &'a [Ancestor]) -> Self {
        self.ancestors = ancestors;
        self
    }

    /// Sets the history key.
    pub fn with_history_key(mut self, key: &'a str) -> Self {
        self.history_key = Some(key);
        self
    }

    /// Sets the forwarded children.
    pub fn with_children(mut self, children: Vec<Fragment>) -> Self {
        self.children = children;
        self
    }
}

/// A view slot with a keep-alive cache.
pub struct RouterView<E: RenderEngine> {
    name: String,
    key: Option<String>,
    attrs: PropMap,
    production: bool,
    hooks: HookSystem,
    cache: ViewCache<E::Instance, E::ScrollTarget>,
    scroll: ScrollManager,
    current_key: Option<CacheKey>,
    last_component: Option<Arc<ComponentDef>>,
    detached: Vec<E::Instance>,
    warnings: Vec<RouteViewError>,
}

impl<E: RenderEngine> RouterView<E> {
    /// Creates a view from its options.
    pub fn new(options: &ViewConfig) -> Self {
        Self {
            name: options.name.clone(),
            key: None,
            attrs: PropMap::new(),
            production: false,
            hooks: HookSystem::new(),
            cache: ViewCache::new(options.max),
            scroll: ScrollManager::new(),
            current_key: None,
            last_component: None,
            detached: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Creates a view from the full configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.view).production(config.general.production)
    }

    /// Assigns an external key. Keys in the `arv` namespace are used as-is.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attributes passed to the view itself, forwarded to every component.
    pub fn with_attrs(mut self, attrs: PropMap) -> Self {
        self.attrs = attrs;
        self
    }

    /// Attaches a hook to every fragment this view emits.
    pub fn with_hook(mut self, hook: Arc<dyn ViewHook>) -> Self {
        self.hooks.register(hook);
        self
    }

    /// Production mode silences configuration warnings.
    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Renders the view for `ctx`.
    pub fn render(&mut self, engine: &mut E, ctx: RenderContext<'_>) -> Fragment {
        let RenderContext {
            route,
            ancestors,
            history_key,
            children,
        } = ctx;

        let placement = resolve_placement(ancestors);
        let data = ViewData {
            router_view: true,
            depth: placement.depth,
            ..ViewData::default()
        };

        if placement.inactive {
            return self.render_inactive(data, children);
        }

        let Some(matched) = route.segment(placement.depth) else {
            tracing::debug!(slot = %self.name, depth = placement.depth, "No matched segment");
            return self.render_empty(engine);
        };
        let Some(component) = matched.component(&self.name).cloned() else {
            tracing::debug!(slot = %self.name, path = %matched.path, "Slot not bound in segment");
            return self.render_empty(engine);
        };
        self.last_component = Some(component.clone());

        let mut hooks = HookSystem::new();
        if let Some(cell) = matched.instance_cell(&self.name) {
            hooks.register(Arc::new(SlotRegistration::new(self.name.clone(), cell)));
        }
        hooks.extend(&self.hooks);

        let resolved = match resolve_props(route, matched.props(&self.name)) {
            Ok(resolved) => resolved,
            Err(err) => {
                self.report(err);
                None
            }
        };
        let split = split_props(&component, resolved, &self.attrs);
        let key = CacheKey::generate(self.key.as_deref(), history_key, component.id, &split.props);

        let mut fragment = Fragment::component(
            component,
            ViewData {
                props: split.props,
                attrs: split.attrs,
                keep_alive: true,
                ..data
            },
            children,
        );
        fragment.key = Some(key.to_string());
        fragment.hooks = hooks;

        self.capture_outgoing(engine, Some(&key));

        let instance = match self.cache.probe(key.as_str()) {
            Some(entry) => {
                let id = entry.instance.id();
                let generation = entry.generation();
                tracing::debug!(slot = %self.name, key = %key, instance = %id, "View cache hit");
                self.scroll.schedule_restore(key.clone(), generation);
                id
            }
            None => {
                tracing::debug!(slot = %self.name, key = %key, "View cache miss");
                self.insert_new(engine, &key, &fragment)
            }
        };

        fragment.instance = Some(instance);
        self.current_key = Some(key);
        self.request_settle(engine);
        fragment
    }

    /// Runs deferred work once the renderer has applied the last render.
    pub fn settle(&mut self, engine: &mut E) -> SettleReport {
        let mut report = self.scroll.run(&mut self.cache, engine);
        for instance in self.detached.drain(..) {
            engine.destroy(instance);
            report.destroyed += 1;
        }
        report
    }

    /// Captures the scroll offset of the active entry.
    pub fn save_scroll(&mut self, engine: &E) -> bool {
        self.capture_outgoing(engine, None)
    }

    /// Destroys every cached instance. Returns how many were destroyed.
    pub fn teardown(&mut self, engine: &mut E) -> usize {
        self.scroll.clear();

        let mut destroyed = 0;
        for (_, entry) in self.cache.evict_all() {
            engine.destroy(entry.instance);
            destroyed += 1;
        }
        for instance in self.detached.drain(..) {
            engine.destroy(instance);
            destroyed += 1;
        }

        self.current_key = None;
        self.last_component = None;
        tracing::info!(slot = %self.name, destroyed, "View torn down");
        destroyed
    }

    /// Slot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cache keys from least to most recently used.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.cache.keys()
    }

    /// Cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Key of the entry rendered last.
    pub fn current_key(&self) -> Option<&CacheKey> {
        self.current_key.as_ref()
    }

    /// Saved scroll offset of a cached entry.
    pub fn saved_scroll(&self, key: &str) -> Option<ScrollOffset> {
        self.cache.peek(key).and_then(|entry| entry.saved_scroll)
    }

    /// Deferred tasks waiting for [`RouterView::settle`].
    pub fn pending_tasks(&self) -> usize {
        self.scroll.pending() + self.detached.len()
    }

    /// Configuration warnings recorded outside production mode.
    pub fn warnings(&self) -> &[RouteViewError] {
        &self.warnings
    }

    /// Returns and clears recorded warnings.
    pub fn take_warnings(&mut self) -> Vec<RouteViewError> {
        std::mem::take(&mut self.warnings)
    }

    fn render_inactive(&mut self, data: ViewData, children: Vec<Fragment>) -> Fragment {
        let Some(component) = self.last_component.clone() else {
            return Fragment::empty();
        };
        let mut fragment = Fragment::component(component, data, children);
        if let Some(key) = &self.current_key {
            fragment.key = Some(key.to_string());
            fragment.instance = self.cache.peek(key.as_str()).map(|entry| entry.instance.id());
        }
        tracing::trace!(slot = %self.name, "Re-emitting preserved view");
        fragment
    }

    fn render_empty(&mut self, engine: &E) -> Fragment {
        self.capture_outgoing(engine, None);
        self.last_component = None;
        self.current_key = None;
        Fragment::empty()
    }

    // Saves the offset of the active entry unless `next` keeps it active.
    fn capture_outgoing(&mut self, engine: &E, next: Option<&CacheKey>) -> bool {
        let Some(current) = self.current_key.as_ref() else {
            return false;
        };
        if next == Some(current) {
            return false;
        }
        match self.cache.peek_mut(current.as_str()) {
            Some(entry) => {
                let captured = ScrollManager::capture(engine, entry);
                if captured {
                    tracing::debug!(key = %current, "Scroll position saved");
                }
                captured
            }
            None => false,
        }
    }

    fn insert_new(&mut self, engine: &mut E, key: &CacheKey, fragment: &Fragment) -> InstanceId {
        let instance = engine.instantiate(fragment);
        let id = instance.id();
        let mounted = self.current_key.as_ref().map(CacheKey::as_str);

        match self.cache.insert(key.clone(), instance, mounted) {
            Ok(evicted) => {
                if let Some(entry) = self.cache.peek(key.as_str()) {
                    self.scroll.schedule_resolve(key.clone(), entry.generation());
                }
                if let Some(eviction) = evicted {
                    self.dispose(engine, eviction);
                }
                id
            }
            Err(DuplicateKey { key, instance }) => {
                engine.destroy(instance);
                let existing = self.cache.peek(key.as_str()).map(|entry| entry.instance.id());
                tracing::warn!(
                    slot = %self.name,
                    error = %RouteViewError::DuplicateKey(key.into()),
                    "Cache insert rejected, keeping existing entry"
                );
                existing.unwrap_or(id)
            }
        }
    }

    fn dispose(&mut self, engine: &mut E, eviction: Eviction<E::Instance, E::ScrollTarget>) {
        let Eviction {
            key,
            entry,
            detached,
        } = eviction;
        if detached {
            tracing::debug!(key = %key, "Deferring destruction of mounted view");
            self.detached.push(entry.instance);
        } else {
            engine.destroy(entry.instance);
        }
    }

    fn request_settle(&self, engine: &mut E) {
        if self.pending_tasks() > 0 {
            engine.request_settle();
        }
    }

    fn report(&mut self, err: RouteViewError) {
        if self.production {
            return;
        }
        tracing::warn!(slot = %self.name, error = %err, "Invalid view configuration");
        self.warnings.push(err);
    }
}

impl<E: RenderEngine> Drop for RouterView<E> {
    fn drop(&mut self) {
        if !self.cache.is_empty() || !self.detached.is_empty() {
            tracing::warn!(
                slot = %self.name,
                cached = self.cache.len(),
                "View dropped without teardown; cached instances leak"
            );
        }
    }
}
