// ABOUTME: TTL result cache with lazy expiry and optional LRU size cap.
// ABOUTME: Entries are checked on lookup; an explicit purge drops stale ones.

use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;
use tokio::time::Instant;

/// A cached tool result.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: Value,
    pub cached_at: Instant,
}

impl CacheEntry {
    /// Valid while `now - cached_at < ttl`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.cached_at) < ttl
    }
}

/// Key/value store of tool results with time-to-live.
///
/// Expired entries are ignored on lookup but not removed; they are
/// dropped by [`ResultCache::purge_expired`], when the size cap forces an
/// eviction, or when the same key is written again. Entries are kept in
/// least-recently-used order: the front of the map is evicted first.
///
/// `max_entries == 0` disables the cap.
#[derive(Debug)]
pub struct ResultCache {
    entries: IndexMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            ttl,
            max_entries,
        }
    }

    /// Look up a fresh value. A hit marks the entry most recently used.
    pub fn get(&mut self, key: &str, now: Instant) -> Option<Value> {
        let index = self.entries.get_index_of(key)?;
        if !self.entries[index].is_fresh(now, self.ttl) {
            return None;
        }

        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        Some(self.entries[last].value.clone())
    }

    /// Store a value, replacing any previous entry under the same key.
    pub fn put(&mut self, key: impl Into<String>, value: Value, now: Instant) {
        let key = key.into();
        self.entries.shift_remove(&key);
        self.entries.insert(
            key.clone(),
            CacheEntry {
                key,
                value,
                cached_at: now,
            },
        );

        if self.max_entries > 0 && self.entries.len() > self.max_entries {
            self.evict(now);
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.is_fresh(now, ttl));
        before - self.entries.len()
    }

    /// Remove everything, returning how many entries were held.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn evict(&mut self, now: Instant) {
        self.purge_expired(now);
        while self.entries.len() > self.max_entries {
            self.entries.shift_remove_index(0);
        }
    }
}
