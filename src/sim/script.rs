//! Navigation script format.
//!
//! ```toml
//! [view]
//! max = 2
//!
//! [[components]]
//! name = "User"
//! props = ["id"]
//!
//! [[routes]]
//! name = "user-1"
//! path = "/user/1"
//! params = { id = "1" }
//!
//! [[routes.segments]]
//! path = "/user/:id"
//! components = { default = "User" }
//! props = { default = true }
//!
//! [[steps]]
//! action = "push"
//! route = "user-1"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::types::config::ViewConfig;
use crate::{RouteViewError, RouteViewResult};

/// A parsed navigation script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Overrides the configured view options.
    #[serde(default)]
    pub view: Option<ViewConfig>,

    /// Component table.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,

    /// Route table, already matched.
    #[serde(default)]
    pub routes: Vec<RouteSpec>,

    /// Steps to replay.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Component declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    /// Identity token. Defaults to the 1-based position in the table.
    #[serde(default)]
    pub id: Option<u32>,

    /// Name referenced by segments.
    pub name: String,

    /// Declared props. Omit to declare none.
    #[serde(default)]
    pub props: Option<Vec<String>>,
}

/// Route declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    /// Name referenced by steps.
    pub name: String,

    /// Resolved path.
    pub path: String,

    /// Path parameters.
    #[serde(default)]
    pub params: BTreeMap<String, toml::Value>,

    /// Matched segments, outermost first.
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
}

/// One matched segment.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentSpec {
    /// Path pattern.
    #[serde(default)]
    pub path: String,

    /// Slot name → component name.
    #[serde(default)]
    pub components: HashMap<String, String>,

    /// Slot name → raw props configuration.
    #[serde(default)]
    pub props: HashMap<String, toml::Value>,

    /// Segments sharing this id reuse the same record, and therefore the
    /// same instance registry, across routes.
    #[serde(default)]
    pub id: Option<String>,
}

/// A replayed navigation step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a route with a new history entry.
    Push { route: String },

    /// Navigate to a route in place.
    Replace { route: String },

    /// History back.
    Back,

    /// History forward.
    Forward,

    /// Scroll the mounted view.
    Scroll {
        #[serde(default)]
        x: f64,
        y: f64,
    },

    /// Save the scroll position of the mounted view.
    SaveScroll,

    /// Deactivate the kept-alive parent.
    Deactivate,

    /// Reactivate the kept-alive parent.
    Activate,

    /// Tear the view down.
    Teardown,
}

impl Step {
    /// Action name as written in scripts.
    pub fn action(&self) -> &'static str {
        match self {
            Step::Push { .. } => "push",
            Step::Replace { .. } => "replace",
            Step::Back => "back",
            Step::Forward => "forward",
            Step::Scroll { .. } => "scroll",
            Step::SaveScroll => "save_scroll",
            Step::Deactivate => "deactivate",
            Step::Activate => "activate",
            Step::Teardown => "teardown",
        }
    }
}

impl Script {
    /// Loads a script from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> RouteViewResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses a script from TOML text.
    pub fn parse(content: &str) -> RouteViewResult<Self> {
        let script: Script = toml::from_str(content)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> RouteViewResult<()> {
        for route in &self.routes {
            for segment in &route.segments {
                for component in segment.components.values() {
                    if !self.components.iter().any(|c| &c.name == component) {
                        return Err(RouteViewError::script(format!(
                            "route '{}' references unknown component '{}'",
                            route.name, component
                        )));
                    }
                }
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            if let Step::Push { route } | Step::Replace { route } = step {
                if !self.routes.iter().any(|r| &r.name == route) {
                    return Err(RouteViewError::script(format!(
                        "step {} references unknown route '{}'",
                        index + 1,
                        route
                    )));
                }
            }
        }

        Ok(())
    }
}
