/**
 * Router Configuration
 *
 * Combines the route groups into one Axum router with request tracing.
 * Unknown paths fall through to a plain 404.
 */

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::routes::session_routes::{clear_session, health, refresh_session, store_session};
use crate::backend::routes::ws_routes::handle_ws_upgrade;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/ws", get(handle_ws_upgrade))
        .route("/api/session", post(store_session).delete(clear_session))
        .route("/api/session/refresh", post(refresh_session))
        .route("/health", get(health))
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
