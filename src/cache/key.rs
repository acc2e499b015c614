//! Composite cache keys.
//!
//! Format: `arv::<history id>::<component id>::props|<k=v&k=v>`, with `null`
//! standing in for a missing history id or an empty property set.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::types::route::{ComponentId, PropMap};

/// Namespace prefix of keys owned by this crate.
pub const KEY_NAMESPACE: &str = "arv";

const SEPARATOR: &str = "::";
const NULL: &str = "null";

/// Identity of a cache entry, also used as the fragment key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds a key from its parts.
    pub fn compose(history_id: Option<&str>, component: ComponentId, props: &PropMap) -> Self {
        let history = history_id.filter(|id| !id.is_empty()).unwrap_or(NULL);
        Self(
            [
                KEY_NAMESPACE.to_string(),
                history.to_string(),
                component.to_string(),
                format!("props|{}", serialize_props(props)),
            ]
            .join(SEPARATOR),
        )
    }

    /// Reuses `existing` when it already lives in our namespace, otherwise composes.
    pub fn generate(
        existing: Option<&str>,
        history_id: Option<&str>,
        component: ComponentId,
        props: &PropMap,
    ) -> Self {
        match existing {
            Some(key) if Self::is_namespaced(key) => Self(key.to_string()),
            _ => Self::compose(history_id, component, props),
        }
    }

    /// Returns true if `key` carries the `arv` namespace.
    pub fn is_namespaced(key: &str) -> bool {
        key.split(SEPARATOR).next() == Some(KEY_NAMESPACE)
    }

    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

/// Serializes props as sorted `k=v` pairs joined by `&`, or `null` when empty.
pub fn serialize_props(props: &PropMap) -> String {
    if props.is_empty() {
        return NULL.to_string();
    }
    props
        .iter()
        .map(|(key, value)| format!("{}={}", key, serialize_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn serialize_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
