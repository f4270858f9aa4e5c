//! Bounded, access-ordered cache.

use std::collections::VecDeque;

/// A cache holding at most `capacity` entries, evicting the least recently
/// used one on overflow. Both `get` and `insert` count as a use.
#[derive(Debug)]
pub struct MruCache<K, V> {
    capacity: usize,
    /// Most recently used first.
    entries: VecDeque<(K, V)>,
}

impl<K: PartialEq, V> MruCache<K, V> {
    /// A zero capacity is bumped to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        if index != 0 {
            let entry = self.entries.remove(index)?;
            self.entries.push_front(entry);
        }
        self.entries.front().map(|(_, v)| v)
    }

    /// Insert or replace `key`, returning the evicted entry if the cache overflowed.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(index) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(index);
        }
        self.entries.push_front((key, value));
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
