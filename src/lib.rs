//! Conduit - Main Library
//!
//! Conduit is a real-time messaging and marketplace server. Clients hold a
//! WebSocket open and send text commands: register, log in, exchange direct
//! messages, list and buy items. Each command gets exactly one JSON result
//! frame back on the same connection.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types: command tags, result frames, messages,
//!   contacts, listings, shared errors
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend: Axum, sqlx, bcrypt,
//!   jsonwebtoken
//!
//! # Usage
//!
//! ```rust,no_run
//! use conduit::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::builder()
//!     .access_secret("change-me")
//!     .build()?;
//! let (_state, app) = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(config.addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Protocol
//!
//! A command is a text frame holding its tag (`login`, `registration`,
//! `sendMessage`, ...). Commands that carry data are followed by a second
//! text frame with a JSON payload. Result frames are JSON objects whose
//! `command` field names the result (`loginResult`, `messagesResult`, ...).
//! Several result frames queued together may arrive in one transport frame,
//! separated by newlines.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
