use std::env;
use std::net::SocketAddr;

use crate::error::AppError;
use crate::store::RestStoreConfig;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_DATABASE_URL: &str = "sqlite://planner.db?mode=rwc";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Set when the remote store is configured; SQLite is used otherwise.
    pub rest_store: Option<RestStoreConfig>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let bind_addr = env::var("PLANNER_ADDR")
            .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("PLANNER_ADDR is not a socket address: {}", e)))?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let rest_store = if env::var("PLANNER_STORE_URL").is_ok() {
            Some(RestStoreConfig::new_from_env()?)
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            database_url,
            rest_store,
        })
    }
}
