//! Integration tests
//!
//! Each file drives the public API the way a deployed server does: real
//! hub task, real connection workers, in-memory storage.

#[cfg(feature = "ssr")]
mod config_test;
#[cfg(feature = "ssr")]
mod connection_test;
#[cfg(feature = "ssr")]
mod gateway_test;
#[cfg(feature = "ssr")]
mod hub_test;
#[cfg(feature = "ssr")]
mod marketplace_test;
#[cfg(feature = "ssr")]
mod messaging_test;
