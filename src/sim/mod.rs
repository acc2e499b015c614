//! Script-driven navigation over the headless engine.
//!
//! A [`Simulation`] owns a [`RouterView`], a [`HeadlessEngine`] and a
//! [`NavigationHistory`], and replays [`Step`]s against them. Every
//! navigation renders, commits the fragment and settles, so each
//! [`StepReport`] shows the state a user would see after the frame.

mod script;

pub use script::{ComponentSpec, RouteSpec, Script, SegmentSpec, Step};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::engine::HeadlessEngine;
use crate::history::NavigationHistory;
use crate::hooks::{HookMetrics, LoggingHook, MetricsHook};
use crate::scroll::{ScrollOffset, SettleReport};
use crate::types::config::ViewConfig;
use crate::types::fragment::InstanceId;
use crate::types::route::{ComponentDef, MatchedSegment, PropMap, PropsConfig, Route};
use crate::view::{Ancestor, RenderContext, RouterView};
use crate::{RouteViewError, RouteViewResult};

/// What one step left behind.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// 1-based step number.
    pub step: usize,

    /// Action name.
    pub action: String,

    /// Route rendered by this step, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// Cache key of the mounted view.
    pub key: Option<String>,

    /// The step was served from the cache.
    pub hit: bool,

    /// Cached keys from least to most recently used.
    pub keys: Vec<String>,

    /// Instance on screen.
    pub instance: Option<InstanceId>,

    /// Instance registered on the route record for this slot.
    pub registered: Option<InstanceId>,

    /// Instances destroyed during this step.
    pub destroyed: Vec<InstanceId>,

    /// Scroll offset of the mounted instance.
    pub scroll: Option<ScrollOffset>,

    /// Deferred work run after the render.
    pub settle: SettleReport,

    /// Configuration warnings raised during this step.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// End-of-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub steps: usize,
    pub cache: CacheStats,
    pub hit_rate: f64,
    pub hooks: HookMetrics,
    pub live_instances: usize,
    pub destroyed: usize,
}

/// Replays navigation scripts.
pub struct Simulation {
    view: RouterView<HeadlessEngine>,
    engine: HeadlessEngine,
    history: NavigationHistory,
    routes: HashMap<String, Route>,
    // History entry key -> route name
    entries: HashMap<String, String>,
    inactive: bool,
    metrics: Arc<MetricsHook>,
    steps: usize,
}

impl Simulation {
    /// Builds a simulation. `options` applies unless the script overrides it.
    pub fn new(script: &Script, options: &ViewConfig, production: bool) -> RouteViewResult<Self> {
        let options = script.view.as_ref().unwrap_or(options);
        let metrics = Arc::new(MetricsHook::new());
        let view = RouterView::new(options)
            .production(production)
            .with_hook(Arc::new(LoggingHook::new()))
            .with_hook(metrics.clone());

        Ok(Self {
            view,
            engine: HeadlessEngine::new(),
            history: NavigationHistory::new("/"),
            routes: build_routes(script)?,
            entries: HashMap::new(),
            inactive: false,
            metrics,
            steps: 0,
        })
    }

    /// Runs every step of `script`.
    pub fn run(&mut self, script: &Script) -> RouteViewResult<Vec<StepReport>> {
        script.steps.iter().map(|step| self.step(step)).collect()
    }

    /// Applies one step.
    pub fn step(&mut self, step: &Step) -> RouteViewResult<StepReport> {
        self.steps += 1;
        let destroyed_before = self.engine.destroyed().len();
        let hits_before = self.view.stats().hits;

        let (route, settle) = match step {
            Step::Push { route } => {
                let url = self.lookup(route)?.path.clone();
                let key = self.history.push(url).to_string();
                self.entries.insert(key, route.clone());
                (Some(route.clone()), self.frame())
            }
            Step::Replace { route } => {
                let url = self.lookup(route)?.path.clone();
                let key = self.history.replace(url).to_string();
                self.entries.insert(key, route.clone());
                (Some(route.clone()), self.frame())
            }
            Step::Back | Step::Forward => {
                let moved = match step {
                    Step::Back => self.history.back().is_some(),
                    _ => self.history.forward().is_some(),
                };
                if moved {
                    (self.current_route_name(), self.frame())
                } else {
                    tracing::debug!(action = step.action(), "History boundary reached");
                    (None, SettleReport::default())
                }
            }
            Step::Scroll { x, y } => {
                if let Some(id) = self.engine.mounted_instance() {
                    self.engine.set_scroll(id, ScrollOffset::new(*x, *y));
                }
                (None, SettleReport::default())
            }
            Step::SaveScroll => {
                self.view.save_scroll(&self.engine);
                (None, SettleReport::default())
            }
            Step::Deactivate => {
                self.inactive = true;
                (None, self.frame())
            }
            Step::Activate => {
                self.inactive = false;
                (self.current_route_name(), self.frame())
            }
            Step::Teardown => {
                self.view.teardown(&mut self.engine);
                (None, SettleReport::default())
            }
        };

        let instance = self.engine.mounted_instance();
        Ok(StepReport {
            step: self.steps,
            action: step.action().to_string(),
            route,
            key: self.view.current_key().map(ToString::to_string),
            hit: self.view.stats().hits > hits_before,
            keys: self.view.keys().into_iter().map(String::from).collect(),
            instance,
            registered: self.registered(),
            destroyed: self.engine.destroyed()[destroyed_before..].to_vec(),
            scroll: instance.and_then(|id| self.engine.scroll_of(id)),
            settle,
            warnings: self
                .view
                .take_warnings()
                .iter()
                .map(ToString::to_string)
                .collect(),
        })
    }

    /// Totals for the run so far.
    pub fn summary(&self) -> Summary {
        Summary {
            steps: self.steps,
            cache: self.view.stats(),
            hit_rate: self.view.stats().hit_rate(),
            hooks: self.metrics.metrics(),
            live_instances: self.engine.live_count(),
            destroyed: self.engine.destroyed().len(),
        }
    }

    /// Destroys whatever is still cached.
    pub fn finish(&mut self) -> usize {
        self.view.teardown(&mut self.engine)
    }

    // Render, commit, settle.
    fn frame(&mut self) -> SettleReport {
        let route = self.current_route();
        let ancestors = [Ancestor::plain().kept_alive(self.inactive), Ancestor::root()];
        let history_key = self.history.current_key().to_string();

        let ctx = RenderContext::new(&route)
            .with_ancestors(&ancestors)
            .with_history_key(&history_key);
        let fragment = self.view.render(&mut self.engine, ctx);
        self.engine.commit(&fragment);
        self.view.settle(&mut self.engine)
    }

    fn current_route_name(&self) -> Option<String> {
        self.entries.get(self.history.current_key()).cloned()
    }

    fn current_route(&self) -> Route {
        self.current_route_name()
            .and_then(|name| self.routes.get(&name).cloned())
            .unwrap_or_else(|| Route::new(self.history.current().url.clone()))
    }

    fn registered(&self) -> Option<InstanceId> {
        let name = self.current_route_name()?;
        self.routes
            .get(&name)?
            .segment(0)?
            .instance(self.view.name())
    }

    fn lookup(&self, route: &str) -> RouteViewResult<&Route> {
        self.routes
            .get(route)
            .ok_or_else(|| RouteViewError::script(format!("unknown route '{}'", route)))
    }
}

fn build_routes(script: &Script) -> RouteViewResult<HashMap<String, Route>> {
    let components: HashMap<&str, Arc<ComponentDef>> = script
        .components
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let id = spec.id.unwrap_or(index as u32 + 1);
            let mut def = ComponentDef::new(id, spec.name.clone());
            if let Some(props) = &spec.props {
                def = def.with_props(props.iter().cloned());
            }
            (spec.name.as_str(), Arc::new(def))
        })
        .collect();

    let mut shared: HashMap<&str, Arc<MatchedSegment>> = HashMap::new();
    let mut routes = HashMap::new();

    for spec in &script.routes {
        let mut route = Route::new(spec.path.clone());
        route.params = to_prop_map(&spec.params)?;

        for segment in &spec.segments {
            if let Some(existing) = segment.id.as_deref().and_then(|id| shared.get(id)) {
                route = route.with_segment(existing.clone());
                continue;
            }

            let mut matched = MatchedSegment::new(segment.path.clone());
            for (slot, name) in &segment.components {
                let component = components.get(name.as_str()).ok_or_else(|| {
                    RouteViewError::script(format!("unknown component '{}'", name))
                })?;
                matched = matched.with_component(slot.clone(), component.clone());
            }
            for (slot, raw) in &segment.props {
                let value = serde_json::to_value(raw)?;
                matched = matched.with_props(slot.clone(), PropsConfig::from_value(&value));
            }

            let matched = Arc::new(matched);
            if let Some(id) = segment.id.as_deref() {
                shared.insert(id, matched.clone());
            }
            route = route.with_segment(matched);
        }

        tracing::trace!(route = %spec.name, segments = route.matched.len(), "Route loaded");
        routes.insert(spec.name.clone(), route);
    }

    Ok(routes)
}

fn to_prop_map<V: Serialize>(values: &BTreeMap<String, V>) -> RouteViewResult<PropMap> {
    let mut props = PropMap::new();
    for (key, value) in values {
        props.insert(key.clone(), serde_json::to_value(value)?);
    }
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
[view]
max = 2

[[components]]
name = "Home"

[[components]]
name = "User"
props = ["id"]

[[routes]]
name = "home"
path = "/"

[[routes.segments]]
path = "/"
components = { default = "Home" }

[[routes]]
name = "user-1"
path = "/user/1"
params = { id = "1" }

[[routes.segments]]
path = "/user/:id"
components = { default = "User" }
props = { default = true }
"#;

    fn simulation() -> (Script, Simulation) {
        let script = Script::parse(SCRIPT).unwrap();
        let sim = Simulation::new(&script, &ViewConfig::default(), false).unwrap();
        (script, sim)
    }

    fn push(route: &str) -> Step {
        Step::Push {
            route: route.to_string(),
        }
    }

    #[test]
    fn test_push_mounts_and_registers() {
        let (_, mut sim) = simulation();
        let report = sim.step(&push("user-1")).unwrap();

        assert_eq!(report.step, 1);
        assert!(!report.hit);
        assert_eq!(report.keys.len(), 1);
        assert!(report.key.as_deref().unwrap().ends_with("::props|id=1"));
        assert!(report.instance.is_some());
        assert_eq!(report.registered, report.instance);
        assert_eq!(report.settle.resolved, 1);
    }

    #[test]
    fn test_back_restores_scroll_from_cache() {
        let (_, mut sim) = simulation();
        let first = sim.step(&push("home")).unwrap();
        sim.step(&Step::Scroll { x: 0.0, y: 120.0 }).unwrap();
        sim.step(&push("user-1")).unwrap();

        let back = sim.step(&Step::Back).unwrap();
        assert!(back.hit);
        assert_eq!(back.instance, first.instance);
        assert_eq!(back.scroll, Some(ScrollOffset::vertical(120.0)));
        assert_eq!(back.settle.restored, 1);
    }

    #[test]
    fn test_back_past_start_renders_nothing() {
        let (_, mut sim) = simulation();
        sim.step(&push("home")).unwrap();

        let report = sim.step(&Step::Back).unwrap();
        assert!(report.key.is_none());
        assert!(report.instance.is_none());
        // Entry stays cached for a later forward
        assert_eq!(report.keys.len(), 1);

        let boundary = sim.step(&Step::Back).unwrap();
        assert!(boundary.route.is_none());
    }

    #[test]
    fn test_deactivate_preserves_view() {
        let (_, mut sim) = simulation();
        let pushed = sim.step(&push("home")).unwrap();

        let report = sim.step(&Step::Deactivate).unwrap();
        assert_eq!(report.instance, pushed.instance);
        assert_eq!(report.key, pushed.key);
        assert!(!report.hit);

        let report = sim.step(&Step::Activate).unwrap();
        assert!(report.hit);
        assert_eq!(report.instance, pushed.instance);
    }

    #[test]
    fn test_teardown_destroys_everything() {
        let (_, mut sim) = simulation();
        sim.step(&push("home")).unwrap();
        sim.step(&push("user-1")).unwrap();

        let report = sim.step(&Step::Teardown).unwrap();
        assert_eq!(report.destroyed.len(), 2);
        assert!(report.keys.is_empty());
        assert!(report.registered.is_none());
        assert_eq!(sim.summary().live_instances, 0);
    }

    #[test]
    fn test_run_and_summary() {
        let text = format!(
            "{}\n[[steps]]\naction = \"push\"\nroute = \"home\"\n\n[[steps]]\naction = \"push\"\nroute = \"user-1\"\n",
            SCRIPT
        );
        let script = Script::parse(&text).unwrap();
        let mut sim = Simulation::new(&script, &ViewConfig::default(), false).unwrap();

        let reports = sim.run(&script).unwrap();
        assert_eq!(reports.len(), 2);

        let summary = sim.summary();
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.cache.size, 2);
        assert_eq!(summary.cache.capacity, 2);
        assert_eq!(summary.hit_rate, 0.0);
        assert_eq!(summary.hooks.registrations, 2);
        assert_eq!(sim.finish(), 2);
    }

    #[test]
    fn test_invalid_props_are_reported() {
        let text = SCRIPT.replace("props = { default = true }", "props = { default = 42 }");
        let script = Script::parse(&text).unwrap();
        let mut sim = Simulation::new(&script, &ViewConfig::default(), false).unwrap();

        let report = sim.step(&push("user-1")).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("is a number"));
        assert!(report.key.as_deref().unwrap().ends_with("::props|null"));
        sim.finish();
    }
}
