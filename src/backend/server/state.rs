/**
 * Application State Management
 *
 * `AppState` is the state shared by every HTTP and WebSocket handler. The
 * `FromRef` implementations let handlers extract only the part they need.
 *
 * # Contents
 *
 * - `hub` - handle to the connection hub task
 * - `dispatcher` - command execution (session gateway + token issuer)
 * - `tokens` - token issuer for the HTTP session endpoints
 * - `connection` - per-connection limits and timers
 *
 * Everything inside is cheap to clone: handles, `Arc`s and small config
 * values.
 *
 * # Example
 *
 * ```rust,no_run
 * use axum::extract::State;
 * use conduit::backend::realtime::HubHandle;
 *
 * async fn handler(State(hub): State<HubHandle>) {
 *     let _ = hub.broadcast("{\"command\":\"notice\"}");
 * }
 * ```
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::{IdentityBindingTable, TokenIssuer};
use crate::backend::connection::{ConnectionConfig, Dispatcher};
use crate::backend::gateway::SessionGateway;
use crate::backend::realtime::HubHandle;
use crate::backend::server::config::ServerConfig;
use crate::backend::storage::StorageGateway;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection hub
    pub hub: HubHandle,

    /// Executes commands arriving on connections
    pub dispatcher: Dispatcher,

    /// Signs and verifies session tokens
    pub tokens: TokenIssuer,

    /// Limits applied to each new connection
    pub connection: ConnectionConfig,
}

impl AppState {
    /// Wire state around a storage adapter and a running hub
    pub fn new(config: &ServerConfig, storage: Arc<dyn StorageGateway>, hub: HubHandle) -> Self {
        let tokens = TokenIssuer::new(&config.access_secret);
        let gateway = SessionGateway::new(Arc::new(IdentityBindingTable::new()), storage);

        Self {
            hub,
            dispatcher: Dispatcher::new(gateway, tokens.clone()),
            tokens,
            connection: config.connection.clone(),
        }
    }
}

impl FromRef<AppState> for HubHandle {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}
