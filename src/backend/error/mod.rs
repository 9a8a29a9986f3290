//! Backend Error Module
//!
//! Error types for the HTTP handlers. They convert to HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! Errors on the WebSocket side never become HTTP responses; they are
//! reported inside result frames (`GatewayError`, `StorageError`) or end the
//! connection (`TransportError`).

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
