/**
 * In-Memory Storage
 *
 * A complete `StorageGateway` kept in process memory. Used by the test suite
 * and by servers started without `DATABASE_URL`. Nothing survives a restart.
 *
 * Password hashing runs outside the state lock; the lock is never held
 * across an `.await`.
 */

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::{now_millis, StorageError, StorageGateway};
use crate::backend::auth::PasswordHasher;
use crate::shared::marketplace::{Listing, NewListing};
use crate::shared::messaging::{Contact, Message, MESSAGE_PAGE_SIZE};

#[derive(Debug, Clone)]
struct Person {
    password_hash: String,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    sender: String,
    receiver: String,
    contents: String,
    sent_at: i64,
    read_at: i64,
}

#[derive(Debug, Default)]
struct State {
    persons: HashMap<String, Person>,
    /// email → username
    emails: HashMap<String, String>,
    messages: Vec<StoredMessage>,
    listings: HashMap<i64, Listing>,
    next_listing_id: i64,
    last_timestamp: i64,
}

impl State {
    fn person_by_identifier(&self, identifier: &str) -> Option<(&str, &Person)> {
        let username = if identifier.contains('@') {
            self.emails.get(identifier)?.as_str()
        } else {
            identifier
        };
        self.persons
            .get_key_value(username)
            .map(|(name, person)| (name.as_str(), person))
    }

    fn require_person(&self, username: &str) -> Result<(), StorageError> {
        if self.persons.contains_key(username) {
            Ok(())
        } else {
            Err(StorageError::AccountNotFound {
                username: username.to_string(),
            })
        }
    }

    /// Strictly increasing millisecond timestamps
    fn next_timestamp(&mut self) -> i64 {
        let now = now_millis().max(self.last_timestamp + 1);
        self.last_timestamp = now;
        now
    }
}

/// `StorageGateway` backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
    hasher: PasswordHasher,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific bcrypt cost (tests use the minimum)
    pub fn with_hasher(hasher: PasswordHasher) -> Self {
        Self {
            state: Mutex::default(),
            hasher,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StorageGateway for MemoryStorage {
    async fn check_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<String, StorageError> {
        let (username, password_hash) = {
            let state = self.lock();
            let (username, person) = state
                .person_by_identifier(identifier)
                .ok_or(StorageError::InvalidCredentials)?;
            (username.to_string(), person.password_hash.clone())
        };

        if self.hasher.verify_async(password, &password_hash).await? {
            Ok(username)
        } else {
            Err(StorageError::InvalidCredentials)
        }
    }

    async fn create_profile(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), StorageError> {
        let password_hash = self.hasher.hash_async(password).await?;

        let mut state = self.lock();
        if state.emails.contains_key(email) {
            return Err(StorageError::EmailInUse);
        }
        if state.persons.contains_key(username) {
            return Err(StorageError::UsernameInUse);
        }

        state.emails.insert(email.to_string(), username.to_string());
        state.persons.insert(
            username.to_string(),
            Person { password_hash },
        );
        debug!("[Storage] Created profile {}", username);
        Ok(())
    }

    async fn create_message(
        &self,
        sender: &str,
        receiver: &str,
        text: &str,
    ) -> Result<(), StorageError> {
        let mut state = self.lock();
        state.require_person(sender)?;
        state.require_person(receiver)?;

        let sent_at = state.next_timestamp();
        state.messages.push(StoredMessage {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            contents: text.to_string(),
            sent_at,
            read_at: 0,
        });
        Ok(())
    }

    async fn get_messages(
        &self,
        viewer: &str,
        counterpart: &str,
        since: i64,
    ) -> Result<Vec<Message>, StorageError> {
        let mut state = self.lock();
        let read_at = state.next_timestamp();

        // Messages are appended in timestamp order, so the scan is ascending.
        let page: Vec<Message> = state
            .messages
            .iter_mut()
            .filter(|m| {
                (m.sender == viewer && m.receiver == counterpart)
                    || (m.sender == counterpart && m.receiver == viewer)
            })
            .filter(|m| m.sent_at > since)
            .take(MESSAGE_PAGE_SIZE)
            .map(|m| {
                let sent_by_viewer = m.sender == viewer;
                if !sent_by_viewer && m.read_at == 0 {
                    m.read_at = read_at;
                }
                Message {
                    contents: m.contents.clone(),
                    timestamp: m.sent_at,
                    read_at: m.read_at,
                    sent_by_viewer,
                }
            })
            .collect();

        Ok(page)
    }

    async fn upload_listing(&self, owner: &str, listing: NewListing) -> Result<i64, StorageError> {
        let mut state = self.lock();
        state.require_person(owner)?;

        state.next_listing_id += 1;
        let id = state.next_listing_id;
        state.listings.insert(id, listing.into_listing(id, owner));
        Ok(id)
    }

    async fn buy_listing(
        &self,
        buyer: &str,
        listing_id: i64,
        amount: i64,
    ) -> Result<(), StorageError> {
        let mut state = self.lock();
        let (owner, active, price) = state
            .listings
            .get(&listing_id)
            .map(|l| (l.owner.clone(), l.active, l.price))
            .ok_or(StorageError::ListingNotFound { listing_id })?;

        state.require_person(buyer)?;
        if owner == buyer {
            return Err(StorageError::SelfPurchase { listing_id });
        }
        if !active {
            return Err(StorageError::AlreadySold { listing_id });
        }
        if amount < price {
            return Err(StorageError::InsufficientAmount { amount, price });
        }

        if let Some(listing) = state.listings.get_mut(&listing_id) {
            listing.active = false;
        }
        debug!("[Storage] {} bought listing {}", buyer, listing_id);
        Ok(())
    }

    async fn get_listing(&self, listing_id: i64) -> Result<Listing, StorageError> {
        self.lock()
            .listings
            .get(&listing_id)
            .cloned()
            .ok_or(StorageError::ListingNotFound { listing_id })
    }

    async fn get_contacts(&self, username: &str) -> Result<Vec<Contact>, StorageError> {
        let state = self.lock();
        let names: BTreeSet<&str> = state
            .messages
            .iter()
            .filter_map(|m| {
                if m.sender == username {
                    Some(m.receiver.as_str())
                } else if m.receiver == username {
                    Some(m.sender.as_str())
                } else {
                    None
                }
            })
            .collect();

        Ok(names
            .into_iter()
            .map(Contact::new)
            .collect())
    }
}

impl std::fmt::Display for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        write!(
            f,
            "memory storage ({} persons, {} messages, {} listings)",
            state.persons.len(),
            state.messages.len(),
            state.listings.len()
        )
    }
}
