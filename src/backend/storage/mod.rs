//! Storage Gateway Module
//!
//! The capability set the rest of the server needs from persistent storage:
//! credentials, profiles, direct messages, listings, purchases and contacts.
//!
//! # Architecture
//!
//! - **`StorageGateway`** - async trait consumed by the session gateway
//! - **`memory`** - in-memory adapter (tests, and servers without a database)
//! - **`graph`** - PostgreSQL adapter storing people and listings as nodes and
//!   messages, sales and purchases as edges
//!
//! # Module Structure
//!
//! ```text
//! storage/
//! ├── mod.rs    - Trait, error kinds and exports
//! ├── memory.rs - In-memory adapter
//! └── graph.rs  - PostgreSQL graph adapter
//! ```
//!
//! # Error Kinds
//!
//! Adapters return a closed set of typed `StorageError` kinds. Callers branch
//! on the variant, never on the message text.

use async_trait::async_trait;
use thiserror::Error;

use crate::backend::auth::PasswordError;
use crate::shared::marketplace::{Listing, NewListing};
use crate::shared::messaging::{Contact, Message};

/// In-memory adapter
pub mod memory;

/// PostgreSQL graph adapter
pub mod graph;

pub use graph::GraphStorage;
pub use memory::MemoryStorage;

/// Typed storage failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Unknown identifier or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration conflict on e-mail
    #[error("an account with that email already exists")]
    EmailInUse,

    /// Registration conflict on username
    #[error("an account with that username already exists")]
    UsernameInUse,

    /// A referenced person does not exist
    #[error("account {username} does not exist")]
    AccountNotFound { username: String },

    /// No listing with this id
    #[error("listing {listing_id} does not exist")]
    ListingNotFound { listing_id: i64 },

    /// The listing was bought already
    #[error("listing {listing_id} has already been sold")]
    AlreadySold { listing_id: i64 },

    /// The buyer owns the listing
    #[error("cannot buy your own listing {listing_id}")]
    SelfPurchase { listing_id: i64 },

    /// The offered amount does not cover the price
    #[error("amount {amount} does not cover price {price}")]
    InsufficientAmount { amount: i64, price: i64 },

    /// Anything the adapter could not classify
    #[error("storage error: {message}")]
    Unknown { message: String },
}

impl StorageError {
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Stable wire code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailInUse => "EMAIL_IN_USE",
            Self::UsernameInUse => "USERNAME_IN_USE",
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::ListingNotFound { .. } => "LISTING_NOT_FOUND",
            Self::AlreadySold { .. } => "ALREADY_SOLD",
            Self::SelfPurchase { .. } => "SELF_PURCHASE",
            Self::InsufficientAmount { .. } => "INSUFFICIENT_AMOUNT",
            Self::Unknown { .. } => "UNKNOWN",
        }
    }
}

impl From<PasswordError> for StorageError {
    fn from(err: PasswordError) -> Self {
        Self::unknown(format!("password hashing failed: {}", err))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::unknown(format!("database error: {}", err))
    }
}

/// Everything the server needs from persistent storage
///
/// Usernames passed in are already authenticated by the caller; adapters do
/// not re-check who is asking.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Verify a password; `identifier` is an e-mail if it contains `@`,
    /// otherwise a username. Returns the account's username.
    async fn check_credentials(&self, identifier: &str, password: &str)
        -> Result<String, StorageError>;

    /// Create an account. E-mail conflicts are reported before username
    /// conflicts.
    async fn create_profile(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), StorageError>;

    /// Store a message from `sender` to `receiver`
    async fn create_message(
        &self,
        sender: &str,
        receiver: &str,
        text: &str,
    ) -> Result<(), StorageError>;

    /// One page of the conversation between `viewer` and `counterpart`
    ///
    /// Ascending by timestamp, at most `MESSAGE_PAGE_SIZE` messages, only
    /// those strictly newer than `since`. Messages addressed to the viewer
    /// are marked read.
    async fn get_messages(
        &self,
        viewer: &str,
        counterpart: &str,
        since: i64,
    ) -> Result<Vec<Message>, StorageError>;

    /// Store a listing owned by `owner`; returns its id
    async fn upload_listing(&self, owner: &str, listing: NewListing)
        -> Result<i64, StorageError>;

    /// Buy a listing
    ///
    /// Checks run in a fixed order: listing exists, buyer exists, buyer is
    /// not the owner, listing still active, amount covers the price.
    async fn buy_listing(
        &self,
        buyer: &str,
        listing_id: i64,
        amount: i64,
    ) -> Result<(), StorageError>;

    /// Fetch a listing by id
    async fn get_listing(&self, listing_id: i64) -> Result<Listing, StorageError>;

    /// Distinct counterparts of `username`, sorted by username
    async fn get_contacts(&self, username: &str) -> Result<Vec<Contact>, StorageError>;
}

/// Unix milliseconds, the timestamp unit of stored messages
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
