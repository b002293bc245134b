//! In-memory TTL cache
//!
//! Entries are immutable once written (`Arc<V>`) and replaced wholesale on
//! recomputation. Each pipeline owns its caches, so tests and concurrent pipelines
//! never share state.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cache lifetimes, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub prediction_ttl_secs: u64,
    pub weather_ttl_secs: u64,
    pub hazard_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prediction_ttl_secs: 12 * 60 * 60,
            weather_ttl_secs: 10 * 60,
            hazard_ttl_secs: 5 * 60,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn prediction_ttl(&self) -> Duration {
        Duration::from_secs(self.prediction_ttl_secs)
    }

    #[must_use]
    pub fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.weather_ttl_secs)
    }

    #[must_use]
    pub fn hazard_ttl(&self) -> Duration {
        Duration::from_secs(self.hazard_ttl_secs)
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: Arc<V>,
    inserted_at: Instant,
}

/// String-keyed read-through cache with a fixed time-to-live
#[derive(Debug)]
pub struct TtlCache<V> {
    name: &'static str,
    ttl: Duration,
    entries: RwLock<FxHashMap<String, CacheEntry<V>>>,
}

impl<V> TtlCache<V> {
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Live entry for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.get_at(key, Instant::now())
    }

    /// Live entry for `key` as of `now`
    #[must_use]
    pub fn get_at(&self, key: &str, now: Instant) -> Option<Arc<V>> {
        // Entries are never mutated in place, so a poisoned map is still consistent
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) < self.ttl {
            debug!(cache = self.name, key, "Cache hit");
            Some(Arc::clone(&entry.value))
        } else {
            None
        }
    }

    /// Store `value`, replacing any previous entry
    pub fn insert(&self, key: impl Into<String>, value: V) -> Arc<V> {
        self.insert_at(key, value, Instant::now())
    }

    /// Store `value` as if written at `now`
    pub fn insert_at(&self, key: impl Into<String>, value: V, now: Instant) -> Arc<V> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.into(),
            CacheEntry {
                value: Arc::clone(&value),
                inserted_at: now,
            },
        );
        value
    }

    /// Return the live entry, or compute, store and return a fresh one
    ///
    /// `fetch` returning `None` (upstream unavailable) stores nothing.
    pub fn get_or_insert_with<F>(&self, key: &str, fetch: F) -> Option<Arc<V>>
    where
        F: FnOnce() -> Option<V>,
    {
        if let Some(hit) = self.get(key) {
            return Some(hit);
        }
        fetch().map(|value| self.insert(key, value))
    }

    /// Drop expired entries; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.inserted_at) < self.ttl);
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
