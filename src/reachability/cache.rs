//! Time-bounded memo for reachability verdicts.

use crate::reachability::ReachabilityResult;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub type ReachabilityCache = TtlCache<ReachabilityResult>;

/// String-keyed cache whose entries expire `ttl` after insertion.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh value for `key` as of `now`; expired entries are dropped.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        let (stored, value) = entries.get(key)?;
        if now.saturating_duration_since(*stored) < self.ttl {
            return Some(value.clone());
        }
        entries.remove(key);
        None
    }

    pub fn insert_at(&self, key: String, value: V, now: Instant) {
        self.lock().insert(key, (now, value));
    }

    /// Cached value for `key`, computing and storing it on a miss. The lock is
    /// not held while `compute` runs.
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(hit) = self.get_at(key, Instant::now()) {
            return hit;
        }
        let value = compute();
        self.insert_at(key.to_string(), value.clone(), Instant::now());
        value
    }

    pub fn invalidate(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, (Instant, V)>> {
        self.entries.lock().unwrap_or_else(|err| err.into_inner())
    }
}
