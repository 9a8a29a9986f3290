/**
 * Server Initialization
 *
 * Builds the Axum application:
 *
 * 1. Choose storage: PostgreSQL when `DATABASE_URL` is set and reachable,
 *    in-memory otherwise
 * 2. Start the connection hub
 * 3. Assemble `AppState` and the router
 *
 * A database that cannot be reached does not stop startup; the server
 * continues on in-memory storage and says so in the log.
 */

use std::sync::Arc;

use axum::Router;
use tracing::{error, info, warn};

use crate::backend::realtime::Hub;
use crate::backend::routes::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;
use crate::backend::storage::{GraphStorage, MemoryStorage, StorageGateway};

/// Pick the storage adapter for `config`
pub async fn load_storage(config: &ServerConfig) -> Arc<dyn StorageGateway> {
    let Some(url) = &config.database_url else {
        warn!("DATABASE_URL not set. Using in-memory storage; data will not survive a restart.");
        return Arc::new(MemoryStorage::with_hasher(config.hasher));
    };

    match GraphStorage::connect(url, config.hasher).await {
        Ok(storage) => {
            info!("Database connection pool created and migrated");
            Arc::new(storage)
        }
        Err(e) => {
            error!("Failed to initialise database storage: {}", e);
            warn!("Falling back to in-memory storage.");
            Arc::new(MemoryStorage::with_hasher(config.hasher))
        }
    }
}

/// Create the application state and router for `config`
pub async fn create_app(config: &ServerConfig) -> (AppState, Router<()>) {
    info!("Initializing conduit server");

    let storage = load_storage(config).await;
    let hub = Hub::spawn();
    let state = AppState::new(config, storage, hub);
    let router = create_router(state.clone());

    (state, router)
}
