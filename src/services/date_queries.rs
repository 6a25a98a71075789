use std::sync::Arc;

use serde_json::Value;

use crate::cache::{QueryCache, QueryKey};
use crate::error::AppError;
use crate::models::CreatedDateRecord;
use crate::store::DateStore;

/// Cached reads of persisted dates.
pub struct DateQueries {
    store: Arc<dyn DateStore>,
    cache: QueryCache,
}

impl DateQueries {
    pub fn new(store: Arc<dyn DateStore>, cache: QueryCache) -> Self {
        Self { store, cache }
    }

    pub async fn date(&self, id: &str) -> Result<Option<CreatedDateRecord>, AppError> {
        let value = self
            .cache
            .fetch(QueryKey::date(id), || async {
                let record = self.store.fetch_date(id).await?;
                Ok::<Value, AppError>(serde_json::to_value(record)?)
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn dates_by_parent(&self, parent_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        let value = self
            .cache
            .fetch(QueryKey::dates_by_parent(parent_id), || async {
                let records = self.store.fetch_dates_by_parent(parent_id).await?;
                Ok::<Value, AppError>(serde_json::to_value(records)?)
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn dates_by_organizer(
        &self,
        organizer_id: &str,
    ) -> Result<Vec<CreatedDateRecord>, AppError> {
        let value = self
            .cache
            .fetch(QueryKey::dates_by_organizer(organizer_id), || async {
                let records = self.store.fetch_dates_by_organizer(organizer_id).await?;
                Ok::<Value, AppError>(serde_json::to_value(records)?)
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn date_count(&self, parent_id: &str) -> Result<usize, AppError> {
        let value = self
            .cache
            .fetch(QueryKey::date_count(parent_id), || async {
                let records = self.store.fetch_dates_by_parent(parent_id).await?;
                Ok::<Value, AppError>(Value::from(records.len()))
            })
            .await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }
}
