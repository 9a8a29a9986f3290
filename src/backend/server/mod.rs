//! Server Module
//!
//! Startup code for the HTTP/WebSocket server.
//!
//! # Architecture
//!
//! - **`config`** - `ServerConfig` loaded from the environment
//! - **`state`** - `AppState` and its `FromRef` implementations
//! - **`init`** - Storage selection and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── config.rs - Environment configuration
//! ├── state.rs  - AppState and FromRef implementations
//! └── init.rs   - Server initialization and app creation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use conduit::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let (_state, app) = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(config.addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, ServerConfig, ServerConfigBuilder};
pub use init::{create_app, load_storage};
pub use state::AppState;
