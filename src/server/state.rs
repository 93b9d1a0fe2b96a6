use super::ServerConfig;
use crate::manager::CatalogManager;
use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

pub type GuardedCatalogManager = Arc<CatalogManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog_manager: GuardedCatalogManager,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, catalog_manager: GuardedCatalogManager) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            catalog_manager,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedCatalogManager {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
