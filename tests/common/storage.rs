//! Storage doubles
//!
//! `CountingStorage` wraps the in-memory adapter and counts every call that
//! reaches it, so tests can prove a request was rejected before storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use conduit::backend::auth::password::MIN_COST;
use conduit::backend::auth::PasswordHasher;
use conduit::backend::storage::{MemoryStorage, StorageError, StorageGateway};
use conduit::shared::{Contact, Listing, Message, NewListing};

/// Cheapest bcrypt cost, for fast tests
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_cost(MIN_COST)
}

pub fn memory_storage() -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::with_hasher(fast_hasher()))
}

#[derive(Debug)]
pub struct CountingStorage {
    inner: MemoryStorage,
    calls: AtomicUsize,
}

impl CountingStorage {
    pub fn new() -> Self {
        Self {
            inner: MemoryStorage::with_hasher(fast_hasher()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for CountingStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageGateway for CountingStorage {
    async fn check_credentials(&self, identifier: &str, password: &str) -> Result<String, StorageError> {
        self.count();
        self.inner.check_credentials(identifier, password).await
    }

    async fn create_profile(&self, username: &str, email: &str, password: &str) -> Result<(), StorageError> {
        self.count();
        self.inner.create_profile(username, email, password).await
    }

    async fn create_message(&self, sender: &str, receiver: &str, text: &str) -> Result<(), StorageError> {
        self.count();
        self.inner.create_message(sender, receiver, text).await
    }

    async fn get_messages(&self, viewer: &str, counterpart: &str, since: i64) -> Result<Vec<Message>, StorageError> {
        self.count();
        self.inner.get_messages(viewer, counterpart, since).await
    }

    async fn upload_listing(&self, owner: &str, listing: NewListing) -> Result<i64, StorageError> {
        self.count();
        self.inner.upload_listing(owner, listing).await
    }

    async fn buy_listing(&self, buyer: &str, listing_id: i64, amount: i64) -> Result<(), StorageError> {
        self.count();
        self.inner.buy_listing(buyer, listing_id, amount).await
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Listing, StorageError> {
        self.count();
        self.inner.get_listing(listing_id).await
    }

    async fn get_contacts(&self, username: &str) -> Result<Vec<Contact>, StorageError> {
        self.count();
        self.inner.get_contacts(username).await
    }
}
