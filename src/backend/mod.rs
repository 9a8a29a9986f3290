//! Backend Module
//!
//! Server-side code: the connection hub, per-connection workers, the
//! session gateway and its storage adapters, and the HTTP surface.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, startup
//! - **`routes`** - WebSocket upgrade and session endpoints
//! - **`connection`** - Inbound/outbound pumps and command dispatch
//! - **`realtime`** - Connection hub (registry and broadcast)
//! - **`gateway`** - Binding-aware command operations
//! - **`storage`** - Storage contract, PostgreSQL and in-memory adapters
//! - **`auth`** - Identity bindings, passwords, tokens, validation
//! - **`error`** - HTTP-facing error type
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs       - Module exports and documentation
//! ├── main.rs      - Server binary
//! ├── server/      - Configuration, state, startup
//! ├── routes/      - HTTP routes
//! ├── connection/  - Connection workers
//! ├── realtime/    - Hub
//! ├── gateway/     - Session gateway
//! ├── storage/     - Storage adapters
//! ├── auth/        - Authentication
//! └── error/       - Error types
//! ```
//!
//! # Concurrency
//!
//! The hub owns its registry inside a single task; everything else talks to
//! it through `HubHandle`. Each connection runs two tasks, joined by a
//! bounded queue whose only strong sender is held by the hub. The identity
//! binding table is the one piece of shared mutable state, behind a
//! `RwLock`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Connection workers
pub mod connection;

/// Connection hub
pub mod realtime;

/// Session gateway
pub mod gateway;

/// Storage contract and adapters
pub mod storage;

/// Authentication
pub mod auth;

/// Backend error types
pub mod error;

pub use error::BackendError;
pub use server::create_app;
