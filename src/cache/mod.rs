//! Query cache shared by the read paths and the mutations that invalidate them.
//!
//! Values are JSON documents addressed by [`QueryKey`]. Each entry carries a
//! generation counter: a read records the generation when it starts and its
//! result is only written back if nothing cancelled the entry in between. The
//! lock is never held across an await.

pub mod keys;
pub mod optimistic;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

use crate::error::AppError;

pub use keys::{QueryFamily, QueryKey};
pub use optimistic::{CacheConsistencyManager, MutationScope};

#[derive(Debug, Clone, PartialEq)]
struct CacheEntry {
    value: Option<Value>,
    stale: bool,
    generation: u64,
    in_flight: bool,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            value: None,
            stale: true,
            generation: 0,
            in_flight: false,
        }
    }
}

/// Saved state of one key: its value and staleness, or `None` if it held nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub value: Option<Value>,
    pub stale: bool,
}

/// State of a set of keys captured before an optimistic change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    entries: Vec<(QueryKey, SnapshotEntry)>,
}

impl CacheSnapshot {
    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn get(&self, key: &QueryKey) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }
}

/// Proof that a read started at a given generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchToken {
    key: QueryKey,
    generation: u64,
}

#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.entries().get(key).and_then(|e| e.value.clone())
    }

    /// Cached value if present and not invalidated.
    pub fn fresh(&self, key: &QueryKey) -> Option<Value> {
        self.entries()
            .get(key)
            .filter(|e| !e.stale)
            .and_then(|e| e.value.clone())
    }

    /// Missing keys count as stale.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries().get(key).is_none_or(|e| e.stale)
    }

    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        self.entries().get(key).is_some_and(|e| e.in_flight)
    }

    pub fn set(&self, key: QueryKey, value: Value) {
        let mut entries = self.entries();
        let entry = entries.entry(key).or_insert_with(CacheEntry::empty);
        entry.value = Some(value);
        entry.stale = false;
    }

    /// Edit a cached value in place. Keys without a value are left alone.
    pub fn update(&self, key: &QueryKey, edit: impl FnOnce(&mut Value)) {
        if let Some(value) = self.entries().get_mut(key).and_then(|e| e.value.as_mut()) {
            edit(value);
        }
    }

    pub fn remove_value(&self, key: &QueryKey) {
        if let Some(entry) = self.entries().get_mut(key) {
            entry.value = None;
        }
    }

    /// Keys currently known to the cache in the given families.
    pub fn keys_in(&self, families: &[QueryFamily]) -> Vec<QueryKey> {
        self.entries()
            .keys()
            .filter(|key| families.contains(&key.family()))
            .cloned()
            .collect()
    }

    pub fn begin_fetch(&self, key: &QueryKey) -> FetchToken {
        let mut entries = self.entries();
        let entry = entries.entry(key.clone()).or_insert_with(CacheEntry::empty);
        entry.in_flight = true;
        FetchToken {
            key: key.clone(),
            generation: entry.generation,
        }
    }

    /// Store a read's result unless the read was cancelled. Returns whether the
    /// value was written.
    pub fn complete_fetch(&self, token: FetchToken, value: Value) -> bool {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(&token.key) else {
            return false;
        };
        if entry.generation != token.generation {
            return false;
        }
        entry.value = Some(value);
        entry.stale = false;
        entry.in_flight = false;
        true
    }

    pub fn abort_fetch(&self, token: &FetchToken) {
        if let Some(entry) = self.entries().get_mut(&token.key) {
            if entry.generation == token.generation {
                entry.in_flight = false;
            }
        }
    }

    /// Cancel any read in flight for `key`: its result will be discarded.
    pub fn cancel(&self, key: &QueryKey) {
        if let Some(entry) = self.entries().get_mut(key) {
            if entry.in_flight {
                debug!("cancelling in-flight read for {}", key);
            }
            entry.generation += 1;
            entry.in_flight = false;
        }
    }

    pub fn cancel_family(&self, family: QueryFamily) {
        for key in self.keys_in(&[family]) {
            self.cancel(&key);
        }
    }

    /// Mark stale so the next access refetches. The value stays readable.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.entries().get_mut(key) {
            entry.stale = true;
        }
    }

    pub fn invalidate_family(&self, family: QueryFamily) {
        for entry in self
            .entries()
            .iter_mut()
            .filter(|(key, _)| key.family() == family)
            .map(|(_, entry)| entry)
        {
            entry.stale = true;
        }
    }

    pub fn snapshot(&self, keys: &[QueryKey]) -> CacheSnapshot {
        let entries = self.entries();
        CacheSnapshot {
            entries: keys
                .iter()
                .map(|key| {
                    let saved = match entries.get(key) {
                        Some(entry) => SnapshotEntry {
                            value: entry.value.clone(),
                            stale: entry.stale,
                        },
                        None => SnapshotEntry {
                            value: None,
                            stale: true,
                        },
                    };
                    (key.clone(), saved)
                })
                .collect(),
        }
    }

    /// Put every captured key back exactly as it was. Keys outside the
    /// snapshot are not touched.
    pub fn restore(&self, snapshot: CacheSnapshot) {
        let mut entries = self.entries();
        for (key, saved) in snapshot.entries {
            let entry = entries.entry(key).or_insert_with(CacheEntry::empty);
            entry.value = saved.value;
            entry.stale = saved.stale;
        }
    }

    /// Serve `key` from the cache when fresh, otherwise run `loader` and store
    /// its result if no mutation cancelled the read meanwhile.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, loader: F) -> Result<Value, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, AppError>>,
    {
        if let Some(value) = self.fresh(&key) {
            return Ok(value);
        }

        let token = self.begin_fetch(&key);
        let value = match loader().await {
            Ok(value) => value,
            Err(e) => {
                self.abort_fetch(&token);
                return Err(e);
            }
        };

        if !self.complete_fetch(token, value.clone()) {
            debug!("discarded cancelled read for {}", key);
        }
        Ok(value)
    }
}
