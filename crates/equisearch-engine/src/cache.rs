//! Query-result LRU cache (spec "IntegratedEngine").
//!
//! Keyed by `<normalized_query>|<top_k>`. The engine holds this behind a
//! mutex; reads and writes are both serialized, matching the concurrency
//! model's "cache reads must not block writers longer than a single entry
//! update" requirement.

use std::collections::{HashMap, VecDeque};

/// What gets cached per key: the unioned BM25 candidates plus the debug
/// flags the pipeline reports alongside them (spec 4.5 step 6).
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSearch {
    pub candidates: Vec<(String, f32)>,
    pub query_corrected: Option<String>,
    pub synonym_expansion_count: usize,
}

/// Fixed-capacity, move-to-front-on-access LRU cache.
pub struct QueryCache {
    capacity: usize,
    entries: HashMap<String, CachedSearch>,
    recency: VecDeque<String>,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: HashMap::new(), recency: VecDeque::new() }
    }

    pub fn key(normalized_query: &str, top_k: usize) -> String {
        format!("{normalized_query}|{top_k}")
    }

    pub fn get(&mut self, key: &str) -> Option<CachedSearch> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.touch(key);
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: String, value: CachedSearch) {
        if !self.entries.contains_key(&key) {
            if self.entries.len() >= self.capacity {
                if let Some(oldest) = self.recency.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
            self.recency.push_back(key.clone());
        } else {
            self.touch(&key);
        }
        self.entries.insert(key, value);
    }

    /// Drop every entry. Called after an index rebuild (spec: cache is
    /// "invalidated on index rebuild").
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            let moved = self.recency.remove(pos).expect("position just found");
            self.recency.push_back(moved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: u32) -> CachedSearch {
        CachedSearch { candidates: vec![(format!("DOC_{n}"), 1.0)], query_corrected: None, synonym_expansion_count: 0 }
    }

    #[test]
    fn key_combines_query_and_top_k() {
        assert_eq!(QueryCache::key("mop industrial", 10), "mop industrial|10");
    }

    #[test]
    fn hit_returns_cached_value() {
        let mut cache = QueryCache::new(4);
        cache.insert("mop|10".to_string(), entry(1));
        assert_eq!(cache.get("mop|10"), Some(entry(1)));
    }

    #[test]
    fn miss_returns_none() {
        let mut cache = QueryCache::new(4);
        assert_eq!(cache.get("absent"), None);
    }

    #[test]
    fn evicts_least_recently_used_when_over_capacity() {
        let mut cache = QueryCache::new(2);
        cache.insert("a".to_string(), entry(1));
        cache.insert("b".to_string(), entry(2));
        cache.get("a");
        cache.insert("c".to_string(), entry(3));
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = QueryCache::new(4);
        cache.insert("a".to_string(), entry(1));
        cache.clear();
        assert_eq!(cache.len(), 0);
    }
}
