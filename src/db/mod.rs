pub mod repository;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;
use crate::models::{CreatedDateRecord, DatePatch, NewDatePayload};
use crate::store::DateStore;

/// Embedded SQLite store, used for local runs and integration tests.
#[derive(Clone)]
pub struct SqliteDateStore {
    db: SqlitePool,
}

impl SqliteDateStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .map_err(|e| AppError::Database(e.into()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl DateStore for SqliteDateStore {
    async fn create_dates(&self, payloads: &[NewDatePayload]) -> Result<Vec<CreatedDateRecord>, AppError> {
        let created = repository::insert_dates(&self.db, payloads).await?;
        info!("sqlite store created {} dates", created.len());
        Ok(created)
    }

    async fn update_date(&self, id: &str, patch: &DatePatch) -> Result<CreatedDateRecord, AppError> {
        repository::update_date(&self.db, id, patch)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn delete_date(&self, id: &str) -> Result<(), AppError> {
        if repository::delete_date(&self.db, id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }

    async fn fetch_date(&self, id: &str) -> Result<Option<CreatedDateRecord>, AppError> {
        Ok(repository::find_date_by_id(&self.db, id).await?)
    }

    async fn fetch_dates_by_parent(&self, parent_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        Ok(repository::fetch_dates_by_parent(&self.db, parent_id).await?)
    }

    async fn fetch_dates_by_organizer(&self, organizer_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        Ok(repository::fetch_dates_by_organizer(&self.db, organizer_id).await?)
    }
}
