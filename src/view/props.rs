//! Property resolution for the matched component.

use crate::types::route::{ComponentDef, PropMap, PropsConfig, Route};
use crate::{RouteViewError, RouteViewResult};

/// Props split into declared props and attribute passthrough.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedProps {
    /// Keys the component declares.
    pub props: PropMap,

    /// Everything else.
    pub attrs: PropMap,
}

/// Applies a property configuration to the route.
///
/// `Invalid` configurations yield an error; callers treat it as "no props".
pub fn resolve_props(route: &Route, config: &PropsConfig) -> RouteViewResult<Option<PropMap>> {
    match config {
        PropsConfig::Absent => Ok(None),
        PropsConfig::Static(map) => Ok(Some(map.clone())),
        PropsConfig::Derived(derive) => Ok(Some((**derive)(route))),
        PropsConfig::FromParams(true) => Ok(Some(route.params.clone())),
        PropsConfig::FromParams(false) => Ok(None),
        PropsConfig::Invalid(found) => Err(RouteViewError::InvalidProps {
            path: route.path.clone(),
            found: found.clone(),
        }),
    }
}

/// Merges passthrough attributes over `resolved` and splits the result by
/// what `component` declares. Always returns fresh maps.
pub fn split_props(
    component: &ComponentDef,
    resolved: Option<PropMap>,
    passthrough: &PropMap,
) -> ResolvedProps {
    let mut merged = resolved.unwrap_or_default();
    merged.extend(passthrough.iter().map(|(k, v)| (k.clone(), v.clone())));

    let mut split = ResolvedProps::default();
    for (key, value) in merged {
        if component.declares(&key) {
            split.props.insert(key, value);
        } else {
            split.attrs.insert(key, value);
        }
    }
    split
}
