//! Optimistic mutations against the query cache.
//!
//! Protocol for a mutation touching `scope`:
//! 1. cancel reads in flight for every affected key,
//! 2. snapshot those keys,
//! 3. apply the optimistic edit and issue the remote call,
//! 4. on failure restore the snapshot as-is,
//! 5. on success invalidate the record key and the aggregate families,
//! 6. in both cases run one more invalidation pass so the cache converges even
//!    if another mutation interleaved with this one.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{QueryCache, QueryFamily, QueryKey};
use crate::error::AppError;
use crate::services::notifier::Notifier;

/// Keys a mutation affects: specific keys plus whole families.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationScope {
    pub keys: Vec<QueryKey>,
    pub families: Vec<QueryFamily>,
}

impl MutationScope {
    /// A single date and every view derived from dates.
    pub fn for_date(id: &str) -> Self {
        Self {
            keys: vec![QueryKey::date(id)],
            families: QueryFamily::DATE_AGGREGATES.to_vec(),
        }
    }

    /// Specific keys first, then every cached key in the families.
    pub fn resolve(&self, cache: &QueryCache) -> Vec<QueryKey> {
        let mut keys = self.keys.clone();
        for key in cache.keys_in(&self.families) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    fn invalidate(&self, cache: &QueryCache) {
        for key in &self.keys {
            cache.invalidate(key);
        }
        for family in &self.families {
            cache.invalidate_family(*family);
        }
    }
}

#[derive(Clone)]
pub struct CacheConsistencyManager {
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
}

impl CacheConsistencyManager {
    pub fn new(cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self { cache, notifier }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Run `call` as an optimistic mutation over `scope`.
    ///
    /// `optimistic` edits the cache before the call is issued and receives the
    /// resolved keys. `failure_message` is shown to the user on rollback.
    pub async fn mutate<T, Fut>(
        &self,
        scope: &MutationScope,
        optimistic: impl FnOnce(&QueryCache, &[QueryKey]),
        call: Fut,
        failure_message: &str,
    ) -> Result<T, AppError>
    where
        Fut: Future<Output = Result<T, AppError>>,
    {
        let keys = scope.resolve(&self.cache);
        for key in &keys {
            self.cache.cancel(key);
        }

        let snapshot = self.cache.snapshot(&keys);
        optimistic(&self.cache, &keys);

        let result = call.await;
        match &result {
            Ok(_) => {
                info!("mutation confirmed, invalidating {} cached keys", keys.len());
                scope.invalidate(&self.cache);
            }
            Err(e) => {
                warn!("mutation failed, rolling back {} cached keys: {}", keys.len(), e);
                self.cache.restore(snapshot);
                self.notifier.error(format!("{}: {}", failure_message, e));
            }
        }

        scope.invalidate(&self.cache);
        result
    }
}

/// Optimistically drop a date from every cached view in `keys`.
pub fn remove_date(cache: &QueryCache, keys: &[QueryKey], id: &str) {
    for key in keys {
        match key {
            QueryKey::Date { id: cached } if cached == id => cache.remove_value(key),
            key if key.is_list() => cache.update(key, |value| {
                if let Some(items) = value.as_array_mut() {
                    items.retain(|item| item.get("id").and_then(|v| v.as_str()) != Some(id));
                }
            }),
            _ => {}
        }
    }
}

/// Optimistically apply `edit` to every cached copy of a date in `keys`.
pub fn edit_date(cache: &QueryCache, keys: &[QueryKey], id: &str, edit: impl Fn(&mut serde_json::Value)) {
    for key in keys {
        match key {
            QueryKey::Date { id: cached } if cached == id => cache.update(key, &edit),
            key if key.is_list() => cache.update(key, |value| {
                if let Some(items) = value.as_array_mut() {
                    items
                        .iter_mut()
                        .filter(|item| item.get("id").and_then(|v| v.as_str()) == Some(id))
                        .for_each(&edit);
                }
            }),
            _ => {}
        }
    }
}
