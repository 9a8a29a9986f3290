//! Connection Worker Module
//!
//! Each live client connection runs two tasks under one supervisor:
//!
//! - **`inbound`** - reads commands, dispatches them, queues the results
//! - **`outbound`** - drains the queue onto the transport and sends pings
//!
//! # Module Structure
//!
//! ```text
//! connection/
//! ├── mod.rs      - ConnectionConfig and the supervisor
//! ├── frame.rs    - Transport-neutral frames and WebSocket adapter
//! ├── dispatch.rs - Command → result frame
//! ├── inbound.rs  - Read loop
//! └── outbound.rs - Write loop
//! ```
//!
//! # Lifecycle
//!
//! 1. A bounded outbound queue is created; its only strong sender goes to the hub
//! 2. Both pumps are spawned
//! 3. Whichever pump ends first ends the other: an inbound exit unregisters
//!    from the hub (closing the queue), an outbound exit aborts the reader
//! 4. The connection is unregistered and its identity binding released

use std::time::Duration;

use futures_util::{Sink, Stream};
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::backend::realtime::HubHandle;

/// Command dispatch
pub mod dispatch;

/// Frames and transport errors
pub mod frame;

/// Read loop
pub mod inbound;

/// Write loop
pub mod outbound;

pub use dispatch::Dispatcher;
pub use frame::{split_websocket, Frame, TransportError};

/// Default outbound queue capacity per connection
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

/// Default maximum inbound frame size in bytes
pub const DEFAULT_MAX_FRAME_BYTES: usize = 8 * 1024;

/// Default liveness window
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);

/// Default bound on a single write
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);

/// Per-connection limits and timers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub outbound_capacity: usize,
    pub max_frame_bytes: usize,
    /// Longest allowed silence from the peer
    pub pong_wait: Duration,
    pub write_wait: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            pong_wait: DEFAULT_PONG_WAIT,
            write_wait: DEFAULT_WRITE_WAIT,
        }
    }
}

impl ConnectionConfig {
    /// Ping interval, nine tenths of the liveness window
    pub fn ping_period(&self) -> Duration {
        self.pong_wait * 9 / 10
    }
}

fn pump_result(
    pump: &str,
    connection_id: &str,
    joined: Result<Result<(), TransportError>, JoinError>,
) -> Result<(), TransportError> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => {
            error!("[Conn] {} {} pump panicked: {}", connection_id, pump, e);
            Err(TransportError::Socket(format!("{} pump panicked", pump)))
        }
    }
}

/// Serve one connection under a fresh id until either side ends it
pub async fn serve_connection<St, Si>(
    frames: St,
    sink: Si,
    hub: HubHandle,
    dispatcher: Dispatcher,
    config: ConnectionConfig,
) -> Result<(), TransportError>
where
    St: Stream<Item = Result<Frame, TransportError>> + Unpin + Send + 'static,
    Si: Sink<Frame, Error = TransportError> + Unpin + Send + 'static,
{
    let connection_id = Uuid::new_v4().to_string();
    serve_connection_as(connection_id, frames, sink, hub, dispatcher, config).await
}

/// Serve one connection under `connection_id`
///
/// Returns the outcome of whichever pump ended first.
pub async fn serve_connection_as<St, Si>(
    connection_id: String,
    frames: St,
    sink: Si,
    hub: HubHandle,
    dispatcher: Dispatcher,
    config: ConnectionConfig,
) -> Result<(), TransportError>
where
    St: Stream<Item = Result<Frame, TransportError>> + Unpin + Send + 'static,
    Si: Sink<Frame, Error = TransportError> + Unpin + Send + 'static,
{
    let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_capacity.max(1));
    let weak_outbound = outbound_tx.downgrade();
    if let Err(e) = hub.register(connection_id.clone(), outbound_tx) {
        error!("[Conn] Cannot register {}: {}", connection_id, e);
        return Err(TransportError::Closed);
    }
    info!("[Conn] {} connected", connection_id);

    let mut inbound = tokio::spawn(inbound::inbound_pump(
        connection_id.clone(),
        frames,
        dispatcher.clone(),
        weak_outbound,
        config.clone(),
    ));
    let mut outbound = tokio::spawn(outbound::outbound_pump(
        connection_id.clone(),
        outbound_rx,
        sink,
        config.clone(),
    ));

    let outcome = tokio::select! {
        joined = &mut inbound => {
            // Closing the queue lets the writer send its close frame.
            let _ = hub.unregister(connection_id.clone());
            if tokio::time::timeout(config.write_wait, &mut outbound).await.is_err() {
                debug!("[Conn] {} writer did not finish, aborting", connection_id);
                outbound.abort();
            }
            pump_result("inbound", &connection_id, joined)
        }
        joined = &mut outbound => {
            inbound.abort();
            let _ = (&mut inbound).await;
            pump_result("outbound", &connection_id, joined)
        }
    };

    let _ = hub.unregister(connection_id.clone());
    dispatcher.gateway().release(&connection_id);

    match &outcome {
        Ok(()) => info!("[Conn] {} disconnected", connection_id),
        Err(e) => info!("[Conn] {} dropped: {}", connection_id, e),
    }
    outcome
}
