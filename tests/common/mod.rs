//! Common test utilities and helpers
//!
//! - Storage doubles
//! - Gateway, dispatcher and connection fixtures
//! - Custom assertion macros

pub mod assertions;
#[cfg(feature = "ssr")]
pub mod storage;

#[cfg(feature = "ssr")]
pub use fixtures::*;
#[cfg(feature = "ssr")]
pub use storage::*;
