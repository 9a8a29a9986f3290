//! Route Configuration Module
//!
//! HTTP routes for the server, grouped by concern.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs            - Module exports and documentation
//! ├── router.rs         - Router assembly and tracing layer
//! ├── ws_routes.rs      - WebSocket upgrade
//! └── session_routes.rs - Session cookie and health endpoints
//! ```
//!
//! # Routes
//!
//! - `GET /ws` - Upgrade to a command connection
//! - `POST /api/session` - Store a token from a login result as a cookie
//! - `POST /api/session/refresh` - Re-issue the cookie token near expiry
//! - `DELETE /api/session` - Clear the cookie
//! - `GET /health` - Liveness and connection count

/// Main router creation
pub mod router;

/// WebSocket upgrade handler
pub mod ws_routes;

/// Session cookie and health handlers
pub mod session_routes;

pub use router::create_router;
