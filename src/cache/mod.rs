//! Transform cache shared by every document of a run.
//!
//! Maps `"<stage>:<cachekey>"` to the text a stage produced for a tag
//! carrying that `cachekey`. Entries are never removed during a run.
//!
//! Concurrent documents may race on the same key: both compute, last write
//! wins. Tags sharing a key are content-identical by contract, so either
//! value is the right one.

mod persist;

use dashmap::DashMap;

use crate::stage::Stage;

pub use persist::{load_cache, persist_cache};

/// Build the composite key for a stage and an author-supplied cache key.
#[inline]
pub fn composite_key(stage: Stage, key: &str) -> String {
    format!("{}:{}", stage.name(), key)
}

/// Thread-safe stage output cache.
#[derive(Debug, Default)]
pub struct TransformCache {
    entries: DashMap<String, String>,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stage: Stage, key: &str) -> Option<String> {
        self.entries
            .get(&composite_key(stage, key))
            .map(|entry| entry.value().clone())
    }

    pub fn insert(&self, stage: Stage, key: &str, value: impl Into<String>) {
        self.entries.insert(composite_key(stage, key), value.into());
    }

    /// Cached value for `key`, or compute it.
    ///
    /// Without a key the value is always computed and nothing is stored.
    /// A failed computation stores nothing.
    pub fn get_or_try_insert<E>(
        &self,
        stage: Stage,
        key: Option<&str>,
        compute: impl FnOnce() -> Result<String, E>,
    ) -> Result<String, E> {
        let Some(key) = key else {
            return compute();
        };
        if let Some(hit) = self.get(stage, key) {
            crate::debug!("cache"; "hit {}", composite_key(stage, key));
            return Ok(hit);
        }
        let value = compute()?;
        self.insert(stage, key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all entries, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Insert raw composite-keyed entries (used when restoring from disk).
    pub fn extend(&self, entries: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in entries {
            self.entries.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_composite_key() {
        assert_eq!(composite_key(Stage::InlineCss, "main"), "inlinecss:main");
        assert_eq!(composite_key(Stage::MinifyJs, ""), "minifyjs:");
    }

    #[test]
    fn test_namespaces_are_separate() {
        let cache = TransformCache::new();
        cache.insert(Stage::InlineCss, "k", "raw");
        cache.insert(Stage::MinifyCss, "k", "min");
        assert_eq!(cache.get(Stage::InlineCss, "k").as_deref(), Some("raw"));
        assert_eq!(cache.get(Stage::MinifyCss, "k").as_deref(), Some("min"));
        assert_eq!(cache.get(Stage::CleanCss, "k"), None);
    }

    #[test]
    fn test_get_or_try_insert_computes_once_per_key() {
        let cache = TransformCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(format!("v{}", calls.get()))
        };

        assert_eq!(cache.get_or_try_insert(Stage::CompileJs, Some("a"), compute), Ok("v1".into()));
        assert_eq!(cache.get_or_try_insert(Stage::CompileJs, Some("a"), compute), Ok("v1".into()));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_get_or_try_insert_without_key_never_stores() {
        let cache = TransformCache::new();
        let value = cache.get_or_try_insert(Stage::MinifyCss, None, || Ok::<_, ()>("x".into()));
        assert_eq!(value, Ok("x".into()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_or_try_insert_error_stores_nothing() {
        let cache = TransformCache::new();
        let value = cache.get_or_try_insert(Stage::MinifyCss, Some("k"), || Err::<String, _>("bad"));
        assert_eq!(value, Err("bad"));
        assert_eq!(cache.get(Stage::MinifyCss, "k"), None);
    }

    #[test]
    fn test_entries_sorted() {
        let cache = TransformCache::new();
        cache.insert(Stage::MinifyJs, "b", "2");
        cache.insert(Stage::InlineJs, "a", "1");
        let keys: Vec<_> = cache.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["inlinejs:a", "minifyjs:b"]);
    }
}
