//! Renderable fragments produced by a view slot.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::hooks::HookSystem;
use crate::types::route::{ComponentDef, PropMap};

/// Identity of a live component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(NonZeroU64);

impl InstanceId {
    /// Wraps a raw id. Returns `None` for zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Id following `prev` in a counter that starts at zero.
    pub fn after(prev: u64) -> Self {
        Self(NonZeroU64::MIN.saturating_add(prev))
    }

    /// Raw value, never zero.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Data bag attached to a fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewData {
    /// Marks fragments emitted by a view slot.
    pub router_view: bool,

    /// Nesting depth of the emitting slot.
    pub depth: usize,

    /// Declared props.
    pub props: PropMap,

    /// Undeclared values passed through as attributes.
    pub attrs: PropMap,

    /// The renderer must deactivate instead of destroying this fragment.
    pub keep_alive: bool,
}

/// Output of a render call.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    /// Component to mount. `None` for the empty fragment.
    pub component: Option<Arc<ComponentDef>>,

    /// External identity; renders with the same key are the same logical node.
    pub key: Option<String>,

    /// Data bag.
    pub data: ViewData,

    /// Slot content forwarded to the component.
    pub children: Vec<Fragment>,

    /// Instance to mount, when the view already owns one.
    pub instance: Option<InstanceId>,

    /// Lifecycle hooks the renderer runs for this fragment.
    pub hooks: HookSystem,
}

impl Fragment {
    /// The empty fragment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a component fragment.
    pub fn component(component: Arc<ComponentDef>, data: ViewData, children: Vec<Fragment>) -> Self {
        Self {
            component: Some(component),
            data,
            children,
            ..Default::default()
        }
    }

    /// Returns true for the empty fragment.
    pub fn is_empty(&self) -> bool {
        self.component.is_none()
    }
}
