use crate::stmt::Value;

use indexmap::IndexMap;
use std::{
    hash::Hash,
    sync::{PoisonError, RwLock},
};
use uuid::Uuid;

/// A bounded map shared between threads.
///
/// Reads take the read lock only. A miss is filled under the write lock
/// after checking again, so concurrent fillers of one key agree on the
/// first value stored. When full, the oldest insertion is evicted.
#[derive(Debug)]
pub struct Cache<K, V> {
    capacity: usize,
    entries: RwLock<IndexMap<K, V>>,
}

/// Backend-neutral SQL text to the backend's rewritten SQL text.
pub type StatementCache = Cache<String, String>;

/// `(class, classifier value)` to the key of the row holding it.
pub type ClassifierCache = Cache<(String, Value), Uuid>;

impl<K, V> Cache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    pub fn new(capacity: usize) -> Cache<K, V> {
        Cache {
            capacity: capacity.max(1),
            entries: RwLock::new(IndexMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stores `value` unless the key is already present, returning the value
    /// that ends up cached.
    pub fn insert(&self, key: K, value: V) -> V {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }

        if entries.len() >= self.capacity {
            entries.shift_remove_index(0);
        }

        entries.insert(key, value.clone());
        value
    }

    /// Returns the cached value for `key`, computing and storing it on a
    /// miss.
    pub fn get_or_insert_with(&self, key: K, f: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }

        self.insert(key, f())
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(key)
    }

    /// Drops every entry, e.g. after the mapping is reloaded.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins() {
        let cache = Cache::new(4);
        assert_eq!(cache.insert("a", 1), 1);
        assert_eq!(cache.insert("a", 2), 1);
        assert_eq!(cache.get(&"a"), Some(1));
    }

    #[test]
    fn evicts_oldest_when_full() {
        let cache = Cache::new(2);
        cache.insert(1, "one");
        cache.insert(2, "two");
        cache.insert(3, "three");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&3), Some("three"));
    }

    #[test]
    fn clear_invalidates() {
        let cache = Cache::new(8);
        cache.insert("sql", "rewritten".to_string());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn compute_on_miss_only() {
        let cache = Cache::new(8);
        let mut calls = 0;
        cache.get_or_insert_with(1, || {
            calls += 1;
            "x"
        });
        cache.get_or_insert_with(1, || {
            calls += 1;
            "y"
        });
        assert_eq!(calls, 1);
    }
}
