/**
 * WebSocket Upgrade
 *
 * `GET /ws` upgrades the request and hands the socket to a connection
 * worker. Axum enforces the frame size limit on the socket itself; the
 * worker checks it again so non-WebSocket transports get the same rule.
 */

use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tracing::debug;

use crate::backend::connection::{serve_connection, split_websocket};
use crate::backend::server::state::AppState;

pub async fn handle_ws_upgrade(State(app_state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let max = app_state.connection.max_frame_bytes;
    ws.max_message_size(max)
        .max_frame_size(max)
        .on_upgrade(move |socket| run_socket(socket, app_state))
}

async fn run_socket(socket: WebSocket, app_state: AppState) {
    let (frames, sink) = split_websocket(socket);
    if let Err(e) = serve_connection(
        frames,
        sink,
        app_state.hub,
        app_state.dispatcher,
        app_state.connection,
    )
    .await
    {
        debug!("[WS] connection ended with {} ({})", e.code(), e);
    }
}
