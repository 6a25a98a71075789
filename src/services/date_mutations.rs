use std::sync::Arc;

use tracing::info;

use crate::cache::optimistic::{edit_date, remove_date};
use crate::cache::{CacheConsistencyManager, MutationScope};
use crate::error::AppError;
use crate::models::{CreatedDateRecord, DatePatch};
use crate::store::DateStore;

/// Single-date mutations that must not leave a deleted or outdated date on
/// screen. Both go through the optimistic cache protocol.
pub struct DateMutations {
    store: Arc<dyn DateStore>,
    manager: CacheConsistencyManager,
}

impl DateMutations {
    pub fn new(store: Arc<dyn DateStore>, manager: CacheConsistencyManager) -> Self {
        Self { store, manager }
    }

    pub async fn delete_date(&self, id: &str) -> Result<(), AppError> {
        info!("deleting date {}", id);
        let scope = MutationScope::for_date(id);
        self.manager
            .mutate(
                &scope,
                |cache, keys| remove_date(cache, keys, id),
                self.store.delete_date(id),
                "Could not delete the date",
            )
            .await
    }

    pub async fn update_date(&self, id: &str, patch: &DatePatch) -> Result<CreatedDateRecord, AppError> {
        if patch.is_empty() {
            return Err(AppError::BadRequest("empty date patch".to_string()));
        }

        info!("updating date {}", id);
        let scope = MutationScope::for_date(id);
        self.manager
            .mutate(
                &scope,
                |cache, keys| edit_date(cache, keys, id, |value| patch.merge_into(value)),
                self.store.update_date(id, patch),
                "Could not update the date",
            )
            .await
    }
}
