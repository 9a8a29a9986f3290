//! Wire Protocol Module
//!
//! Command tags, command payloads and result frames exchanged over the
//! persistent client connection.
//!
//! # Module Structure
//!
//! ```text
//! protocol/
//! ├── mod.rs      - Module exports and documentation
//! ├── command.rs  - Command tags and their JSON payloads
//! └── response.rs - Result frames and registration response codes
//! ```

pub mod command;
pub mod response;

pub use command::{
    CommandTag, ListingQuery, LoginPayload, MessagePayload, MessagesQuery, PurchasePayload,
    RegistrationPayload,
};
pub use response::{
    RegistrationCode, ServerFrame, INVALID_PAYLOAD, MALFORMED_PAYLOAD, UNKNOWN_COMMAND,
};
