use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::services::ai_client::GeminiClient;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub ai: GeminiClient,
}

impl AppState {
    pub fn new(db: DbPool, config: Config, ai: GeminiClient) -> Self {
        Self {
            db,
            config: Arc::new(config),
            ai,
        }
    }
}
