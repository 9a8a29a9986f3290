//! Real-time Delivery Module
//!
//! Server-push side of the WebSocket service.
//!
//! # Architecture
//!
//! - **`hub`** - Registry of live connections and broadcast fan-out
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs - Module exports and documentation
//! └── hub.rs - Connection hub
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use conduit::backend::realtime::Hub;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), conduit::backend::realtime::HubError> {
//! let hub = Hub::spawn();
//! let (outbound, _queue) = mpsc::channel(256);
//! hub.register("connection-1", outbound)?;
//! hub.broadcast("{\"command\":\"notice\"}")?;
//! # Ok(())
//! # }
//! ```

/// Connection hub
pub mod hub;

pub use hub::{Hub, HubError, HubEvent, HubHandle, OutboundSender};
