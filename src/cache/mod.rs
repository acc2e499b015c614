//! LRU cache of rendered view instances.
//!
//! [`ViewCache`] maps a [`CacheKey`] to the instance rendered for it and keeps
//! keys in recency order. Once the configured capacity is exceeded the least
//! recently used entry is evicted; the caller destroys its instance.

mod key;
mod lru;

pub use key::{serialize_props, CacheKey, KEY_NAMESPACE};
pub use lru::{CacheEntry, CacheStats, DuplicateKey, Eviction, ViewCache};
