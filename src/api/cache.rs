//! Memoizing lookup cache
//!
//! Sits in front of single-resource GETs. Entries stay valid until
//! [`LookupCache::clear`]; mutations performed through the transport do not
//! touch the cache, so a caller that wants to observe its own writes must
//! clear first. That staleness is part of the contract, not an accident.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

#[derive(Default)]
pub struct LookupCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(path)
            .cloned()
    }

    pub fn insert(&self, path: String, doc: Value) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path, doc);
    }

    /// Drop every entry. The only invalidation this cache has.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_persist_until_clear() {
        let cache = LookupCache::new();
        cache.insert("/groups/abc".into(), json!({"id": "abc"}));

        assert_eq!(cache.get("/groups/abc"), Some(json!({"id": "abc"})));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.get("/groups/abc").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_overwrites_the_previous_entry() {
        let cache = LookupCache::new();
        cache.insert("/groups/abc".into(), json!({"paused": false}));
        cache.insert("/groups/abc".into(), json!({"paused": true}));
        assert_eq!(cache.get("/groups/abc"), Some(json!({"paused": true})));
    }
}
