pub mod dto;

use std::env;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{CreatedDateRecord, DatePatch, NewDatePayload};

const DATE_COLUMNS: &str =
    "id,fecha,hora_inicio,hora_fin,lugar,ciudad,parent_id,organizer_id,nombre,flyer_url,estado_publicacion";

#[derive(Clone, Debug)]
pub struct RestStoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub dates_table: String,
}

impl RestStoreConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("PLANNER_STORE_URL")
            .map_err(|_| AppError::Config("PLANNER_STORE_URL is not set".to_string()))?;
        let api_key = env::var("PLANNER_STORE_KEY")
            .map_err(|_| AppError::Config("PLANNER_STORE_KEY is not set".to_string()))?;
        let dates_table =
            env::var("PLANNER_DATES_TABLE").unwrap_or_else(|_| "events_date".to_string());

        Ok(Self {
            base_url,
            api_key,
            dates_table,
        })
    }
}

/// The remote data service holding persisted event dates.
///
/// `create_dates` is a single batch insert. The returned records carry no
/// reference to the payload they came from, may be in any order and may be
/// fewer than the payloads sent.
#[async_trait]
pub trait DateStore: Send + Sync {
    async fn create_dates(&self, payloads: &[NewDatePayload]) -> Result<Vec<CreatedDateRecord>, AppError>;
    async fn update_date(&self, id: &str, patch: &DatePatch) -> Result<CreatedDateRecord, AppError>;
    async fn delete_date(&self, id: &str) -> Result<(), AppError>;
    async fn fetch_date(&self, id: &str) -> Result<Option<CreatedDateRecord>, AppError>;
    async fn fetch_dates_by_parent(&self, parent_id: &str) -> Result<Vec<CreatedDateRecord>, AppError>;
    async fn fetch_dates_by_organizer(&self, organizer_id: &str) -> Result<Vec<CreatedDateRecord>, AppError>;
}

/// PostgREST-style HTTP store.
pub struct RestDateStore {
    client: Client,
    config: RestStoreConfig,
}

impl RestDateStore {
    pub fn new(config: RestStoreConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.dates_table
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Prefer", "return=representation")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        let response = self.authorized(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<dto::StoreErrorBody>(&body)
                .map(|e| e.describe())
                .unwrap_or(body);
            return Err(AppError::Remote(format!("{}: {}", status, detail)));
        }

        Ok(response)
    }

    /// Restrict `request` to one date. The id is sent as an encoded query value.
    fn by_id(&self, request: RequestBuilder, id: &str) -> RequestBuilder {
        request.query(&[("id", format!("eq.{}", id))])
    }

    fn selecting(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("select", DATE_COLUMNS)])
    }

    async fn fetch_where(&self, column: &str, value: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        let request = self.client.get(self.table_url()).query(&[
            (column, format!("eq.{}", value)),
            ("order", "fecha.asc,hora_inicio.asc".to_string()),
        ]);
        let response = self.send(self.selecting(request)).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DateStore for RestDateStore {
    async fn create_dates(&self, payloads: &[NewDatePayload]) -> Result<Vec<CreatedDateRecord>, AppError> {
        let request = self.selecting(self.client.post(self.table_url()).json(payloads));
        let response = self.send(request).await?;
        let created: Vec<CreatedDateRecord> = response.json().await?;
        info!("store created {} of {} dates", created.len(), payloads.len());
        Ok(created)
    }

    async fn update_date(&self, id: &str, patch: &DatePatch) -> Result<CreatedDateRecord, AppError> {
        let request = self.by_id(self.client.patch(self.table_url()).json(patch), id);
        let response = self.send(self.selecting(request)).await?;
        let updated: Vec<CreatedDateRecord> = response.json().await?;
        updated.into_iter().next().ok_or(AppError::NotFound)
    }

    async fn delete_date(&self, id: &str) -> Result<(), AppError> {
        let request = self.by_id(self.client.delete(self.table_url()), id);
        self.send(request).await?;
        debug!("store deleted date {}", id);
        Ok(())
    }

    async fn fetch_date(&self, id: &str) -> Result<Option<CreatedDateRecord>, AppError> {
        let records = self.fetch_where("id", id).await?;
        Ok(records.into_iter().next())
    }

    async fn fetch_dates_by_parent(&self, parent_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        self.fetch_where("parent_id", parent_id).await
    }

    async fn fetch_dates_by_organizer(&self, organizer_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        self.fetch_where("organizer_id", organizer_id).await
    }
}

/// Accepts every write and returns nothing.
pub struct NoopDateStore;

#[async_trait]
impl DateStore for NoopDateStore {
    async fn create_dates(&self, _payloads: &[NewDatePayload]) -> Result<Vec<CreatedDateRecord>, AppError> {
        Ok(Vec::new())
    }

    async fn update_date(&self, _id: &str, _patch: &DatePatch) -> Result<CreatedDateRecord, AppError> {
        Err(AppError::NotFound)
    }

    async fn delete_date(&self, _id: &str) -> Result<(), AppError> {
        Ok(())
    }

    async fn fetch_date(&self, _id: &str) -> Result<Option<CreatedDateRecord>, AppError> {
        Ok(None)
    }

    async fn fetch_dates_by_parent(&self, _parent_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        Ok(Vec::new())
    }

    async fn fetch_dates_by_organizer(&self, _organizer_id: &str) -> Result<Vec<CreatedDateRecord>, AppError> {
        Ok(Vec::new())
    }
}
