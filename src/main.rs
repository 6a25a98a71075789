use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dance_planner::api::router;
use dance_planner::config::AppConfig;
use dance_planner::db::SqliteDateStore;
use dance_planner::models::DateTemplate;
use dance_planner::state::AppState;
use dance_planner::store::{DateStore, RestDateStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dance_planner=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let store: Arc<dyn DateStore> = match config.rest_store {
        Some(rest) => {
            info!("using remote date store at {}", rest.base_url);
            Arc::new(RestDateStore::new(rest)?)
        }
        None => {
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&config.database_url)
                .await?;
            let sqlite = SqliteDateStore::new(pool);
            sqlite.migrate().await?;
            info!("using sqlite date store at {}", config.database_url);
            Arc::new(sqlite)
        }
    };

    let state = AppState::new(store, DateTemplate::default());
    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
