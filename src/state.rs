// src/state.rs
// Application context handed to every handler through axum's `State` extractor

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::StockroomConfig;
use crate::inventory::{ProductRepository, ProjectRepository, SqliteInventoryStore};
use crate::upstream::UpstreamClient;

pub struct AppState {
    pub config: StockroomConfig,
    pub projects: Arc<dyn ProjectRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(
        config: StockroomConfig,
        projects: Arc<dyn ProjectRepository>,
        products: Arc<dyn ProductRepository>,
        upstream: UpstreamClient,
    ) -> Self {
        Self {
            config,
            projects,
            products,
            upstream,
        }
    }

    /// Wire both repositories to one SQLite store and build the upstream client from config.
    pub fn with_sqlite(config: StockroomConfig, pool: SqlitePool) -> Self {
        let store = Arc::new(SqliteInventoryStore::new(pool));
        let upstream = UpstreamClient::from_config(&config);
        Self::new(config, store.clone(), store, upstream)
    }
}

pub fn create_app_state(config: StockroomConfig, pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::with_sqlite(config, pool))
}
