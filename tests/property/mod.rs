//! Property-based tests

#[cfg(feature = "ssr")]
mod bindings_proptest;
mod command_proptest;
mod message_proptest;
