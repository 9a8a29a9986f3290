//! Messaging Module
//!
//! This module contains the data structures for direct messaging:
//!
//! - `Message` - A direct message, presented relative to a viewer
//! - `Contact` - A counterpart derived from message history
//!
//! # Usage
//!
//! ```rust
//! use conduit::shared::messaging::{Contact, Message, MESSAGE_PAGE_SIZE};
//! ```

pub mod contact;
pub mod message;

pub use contact::Contact;
pub use message::{next_cursor, validate_contents, Message, MAX_MESSAGE_CHARS, MESSAGE_PAGE_SIZE};
