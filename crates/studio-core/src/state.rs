//! Concurrent keyed document storage.
//!
//! Provides [`DocumentStore`], a thread-safe map from document key to value
//! used by the in-memory settings backend.

use dashmap::DashMap;

/// Thread-safe keyed document store.
///
/// Keys are case-sensitive strings; callers normalize them before use.
/// Uses `DashMap` for lock-free concurrent access.
///
/// # Examples
///
/// ```
/// use studio_core::DocumentStore;
///
/// let store = DocumentStore::<u32>::new();
/// store.put("home", 1);
/// assert_eq!(store.get("home"), Some(1));
/// ```
#[derive(Debug)]
pub struct DocumentStore<T: Clone + Send + Sync> {
    inner: DashMap<String, T>,
}

impl<T: Clone + Send + Sync> DocumentStore<T> {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Get a copy of the document stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<T> {
        self.inner.get(key).map(|v| v.clone())
    }

    /// Insert or replace the document stored under `key`.
    pub fn put(&self, key: impl Into<String>, value: T) -> Option<T> {
        self.inner.insert(key.into(), value)
    }

    /// Atomically update the document under `key`, creating it with `init` first
    /// if it does not exist. Returns the updated document.
    pub fn upsert_with(
        &self,
        key: impl Into<String>,
        init: impl FnOnce() -> T,
        update: impl FnOnce(&mut T),
    ) -> T {
        let mut entry = self.inner.entry(key.into()).or_insert_with(init);
        update(entry.value_mut());
        entry.value().clone()
    }

    /// All `(key, document)` pairs, sorted by key.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, T)> {
        let mut all: Vec<(String, T)> = self
            .inner
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone + Send + Sync> Default for DocumentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_return_none_for_missing_key() {
        let store = DocumentStore::<String>::new();
        assert!(store.get("home").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_should_replace_existing_document() {
        let store = DocumentStore::<u32>::new();
        assert!(store.put("home", 1).is_none());
        assert_eq!(store.put("home", 2), Some(1));
        assert_eq!(store.get("home"), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_should_upsert_with_initial_value() {
        let store = DocumentStore::<Vec<u32>>::new();
        let first = store.upsert_with("about", Vec::new, |v| v.push(1));
        assert_eq!(first, vec![1]);
        let second = store.upsert_with("about", Vec::new, |v| v.push(2));
        assert_eq!(second, vec![1, 2]);
    }

    #[test]
    fn test_should_list_entries_sorted_by_key() {
        let store = DocumentStore::<u32>::new();
        store.put("services", 3);
        store.put("home", 1);
        store.put("gallery", 2);
        let keys: Vec<String> = store.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["gallery", "home", "services"]);
    }
}
