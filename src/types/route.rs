//! Route records consumed from the routing layer.
//!
//! Matching URLs against patterns happens elsewhere; a [`Route`] arrives here
//! already resolved into its ordered sequence of [`MatchedSegment`]s.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::hooks::{InstanceCell, InstanceRegistry};
use crate::types::fragment::InstanceId;

/// Property bag passed to a component. Ordered by key.
pub type PropMap = BTreeMap<String, Value>;

/// Component identity token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A component the view can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDef {
    /// Identity token, stable for the lifetime of the component type.
    pub id: ComponentId,

    /// Human readable name.
    pub name: String,

    /// Declared props. `None` means the component declares nothing and every
    /// resolved value becomes an attribute.
    pub props: Option<BTreeSet<String>>,
}

impl ComponentDef {
    /// Creates a component without declared props.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: ComponentId(id),
            name: name.into(),
            props: None,
        }
    }

    /// Declares the props this component accepts.
    pub fn with_props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.props = Some(props.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if `key` is a declared prop.
    pub fn declares(&self, key: &str) -> bool {
        self.props.as_ref().is_some_and(|props| props.contains(key))
    }
}

/// Function deriving props from the current route.
pub type PropsFn = Arc<dyn Fn(&Route) -> PropMap + Send + Sync>;

/// Per-slot property configuration, decided once when the route table loads.
#[derive(Clone, Default)]
pub enum PropsConfig {
    /// No configuration.
    #[default]
    Absent,
    /// Fixed mapping, passed as-is.
    Static(PropMap),
    /// Computed from the route on every render.
    Derived(PropsFn),
    /// `true` passes the route params, `false` passes nothing.
    FromParams(bool),
    /// Unsupported shape; carries the type name that was found.
    Invalid(String),
}

impl PropsConfig {
    /// Wraps a closure as a derived configuration.
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&Route) -> PropMap + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    /// Classifies a loosely typed value (from a route table file).
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Bool(flag) => Self::FromParams(*flag),
            Value::Object(map) => Self::Static(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            Value::Number(_) => Self::Invalid("number".to_string()),
            Value::String(_) => Self::Invalid("string".to_string()),
            Value::Array(_) => Self::Invalid("array".to_string()),
        }
    }
}

impl fmt::Debug for PropsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropsConfig::Absent => write!(f, "Absent"),
            PropsConfig::Static(map) => f.debug_tuple("Static").field(map).finish(),
            PropsConfig::Derived(_) => write!(f, "Derived(<fn>)"),
            PropsConfig::FromParams(flag) => f.debug_tuple("FromParams").field(flag).finish(),
            PropsConfig::Invalid(found) => f.debug_tuple("Invalid").field(found).finish(),
        }
    }
}

/// Route resolution record for one nesting level.
#[derive(Debug, Default)]
pub struct MatchedSegment {
    /// Path pattern this segment matched.
    pub path: String,

    components: HashMap<String, Arc<ComponentDef>>,
    props: HashMap<String, PropsConfig>,
    instances: InstanceRegistry,
}

impl MatchedSegment {
    /// Creates an empty segment for a path pattern.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Binds a component to a named slot.
    pub fn with_component(mut self, slot: impl Into<String>, component: Arc<ComponentDef>) -> Self {
        let slot = slot.into();
        self.instances.add_slot(&slot);
        self.components.insert(slot, component);
        self
    }

    /// Sets the property configuration of a named slot.
    pub fn with_props(mut self, slot: impl Into<String>, config: PropsConfig) -> Self {
        self.props.insert(slot.into(), config);
        self
    }

    /// Component bound to `slot`.
    pub fn component(&self, slot: &str) -> Option<&Arc<ComponentDef>> {
        self.components.get(slot)
    }

    /// Property configuration of `slot`.
    pub fn props(&self, slot: &str) -> &PropsConfig {
        static ABSENT: PropsConfig = PropsConfig::Absent;
        self.props.get(slot).unwrap_or(&ABSENT)
    }

    /// Shared instance cell of `slot`.
    pub fn instance_cell(&self, slot: &str) -> Option<InstanceCell> {
        self.instances.cell(slot)
    }

    /// Instance currently registered in `slot`.
    pub fn instance(&self, slot: &str) -> Option<InstanceId> {
        self.instances.get(slot)
    }
}

/// The current route.
#[derive(Debug, Clone, Default)]
pub struct Route {
    /// Resolved path.
    pub path: String,

    /// Path parameters.
    pub params: PropMap,

    /// Matched segments, outermost first.
    pub matched: Vec<Arc<MatchedSegment>>,
}

impl Route {
    /// Creates a route without params.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Sets a path parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Appends a matched segment.
    pub fn with_segment(mut self, segment: Arc<MatchedSegment>) -> Self {
        self.matched.push(segment);
        self
    }

    /// Segment applying at `depth`.
    pub fn segment(&self, depth: usize) -> Option<&Arc<MatchedSegment>> {
        self.matched.get(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_props_config_from_value() {
        assert!(matches!(PropsConfig::from_value(&Value::Null), PropsConfig::Absent));
        assert!(matches!(
            PropsConfig::from_value(&json!(true)),
            PropsConfig::FromParams(true)
        ));
        assert!(matches!(
            PropsConfig::from_value(&json!(false)),
            PropsConfig::FromParams(false)
        ));

        match PropsConfig::from_value(&json!({ "id": 7 })) {
            PropsConfig::Static(map) => assert_eq!(map.get("id"), Some(&json!(7))),
            other => panic!("unexpected config: {:?}", other),
        }

        match PropsConfig::from_value(&json!(42)) {
            PropsConfig::Invalid(found) => assert_eq!(found, "number"),
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_segment_slots() {
        let user = Arc::new(ComponentDef::new(1, "User").with_props(["id"]));
        let segment = MatchedSegment::new("/user/:id")
            .with_component("default", user.clone())
            .with_props("default", PropsConfig::FromParams(true));

        assert_eq!(segment.component("default"), Some(&user));
        assert!(segment.component("sidebar").is_none());
        assert!(matches!(segment.props("default"), PropsConfig::FromParams(true)));
        assert!(matches!(segment.props("sidebar"), PropsConfig::Absent));
        assert!(segment.instance_cell("default").is_some());
        assert!(segment.instance("default").is_none());
    }

    #[test]
    fn test_component_declares() {
        let bare = ComponentDef::new(2, "Bare");
        let typed = ComponentDef::new(3, "Typed").with_props(["a", "b"]);

        assert!(!bare.declares("a"));
        assert!(typed.declares("a"));
        assert!(!typed.declares("c"));
    }
}
