//! Shared Module
//!
//! This module contains the types that cross the wire between clients and
//! the server: direct messages, contacts, marketplace listings, and the
//! command/result frames of the connection protocol.
//!
//! # Overview
//!
//! The shared module has no server dependencies. Everything here is plain
//! data designed for JSON serialization.

/// Direct messages and contacts
pub mod messaging;

/// Marketplace listings
pub mod marketplace;

/// Command and result frames
pub mod protocol;

/// Shared error types
pub mod error;

pub use error::SharedError;
pub use marketplace::{Listing, NewListing};
pub use messaging::{Contact, Message};
pub use protocol::{CommandTag, RegistrationCode, ServerFrame};
