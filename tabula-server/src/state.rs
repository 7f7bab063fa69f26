//! Application state shared across handlers.

use std::sync::Arc;

use tabula_engine::CacheManager;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub cache: CacheManager,
}

impl AppState {
    pub fn new(config: ServerConfig, cache: CacheManager) -> Self {
        Self {
            config: Arc::new(config),
            cache,
        }
    }
}
