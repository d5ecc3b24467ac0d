//! Shared application state for all routes. The model is immutable after startup.

use crate::config::AppConfig;
use crate::model::ResolvedModel;
use crate::service::PgDataSource;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub model: Arc<ResolvedModel>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, model: ResolvedModel, config: AppConfig) -> Self {
        AppState {
            pool,
            model: Arc::new(model),
            config: Arc::new(config),
        }
    }

    /// Collections over this state's pool and model.
    pub fn source(&self) -> PgDataSource {
        PgDataSource::new(self.pool.clone(), self.model.clone())
    }
}
