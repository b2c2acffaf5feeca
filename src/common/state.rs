// Application state shared across all modules

use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

use super::config::AppConfig;

/// Application state containing the database pool and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub upload_dir: PathBuf,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self {
            db,
            upload_dir: config.upload_dir.clone(),
            config: Arc::new(config),
        }
    }
}
