//! Bounded render cache.

use std::collections::HashMap;

use log::debug;

/// Number of distinct renders kept before the cache is flushed.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Maps cache keys to rendered CSS bodies.
///
/// Eviction is all-or-nothing: the insert that would push the store past its
/// capacity first discards every entry, then stores the new one.
#[derive(Debug, Clone)]
pub struct RenderCache {
    entries: HashMap<String, String>,
    inserts: usize,
    capacity: usize,
}

impl RenderCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            inserts: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: String, css: String) {
        if self.inserts >= self.capacity {
            debug!(
                "render cache reached {} entries, flushing",
                self.entries.len()
            );
            self.clear();
        }
        self.inserts += 1;
        self.entries.insert(key, css);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.inserts = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
