//! Session Gateway Module
//!
//! Sits between a connection and storage. Every privileged operation first
//! resolves the connection's bound identity; unbound connections are refused
//! before storage sees the request.
//!
//! # Flow
//!
//! ```text
//! connection id ──► IdentityBindingTable ──► username ──► StorageGateway
//!                        │
//!                        └─ unbound ──► NotAuthenticated (no storage call)
//! ```
//!
//! Storage errors pass through unchanged inside `GatewayError::Storage`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::backend::auth::{BindingError, IdentityBindingTable};
use crate::backend::storage::{StorageError, StorageGateway};
use crate::shared::marketplace::{Listing, NewListing};
use crate::shared::messaging::{Contact, Message};

/// Gateway failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The connection has no bound identity
    #[error("connection is not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GatewayError {
    /// Stable wire code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::Binding(BindingError::AlreadyBound { .. }) => "ALREADY_LOGGED_IN",
            Self::Binding(BindingError::NotBound { .. }) => "NOT_BOUND",
            Self::Storage(err) => err.code(),
        }
    }
}

/// Per-connection authorization in front of storage
#[derive(Clone)]
pub struct SessionGateway {
    bindings: Arc<IdentityBindingTable>,
    storage: Arc<dyn StorageGateway>,
}

impl std::fmt::Debug for SessionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGateway")
            .field("bound_connections", &self.bindings.len())
            .finish_non_exhaustive()
    }
}

impl SessionGateway {
    pub fn new(bindings: Arc<IdentityBindingTable>, storage: Arc<dyn StorageGateway>) -> Self {
        Self { bindings, storage }
    }

    pub fn bindings(&self) -> &Arc<IdentityBindingTable> {
        &self.bindings
    }

    /// Username bound to `connection_id`, or `NotAuthenticated`
    fn identity(&self, connection_id: &str) -> Result<String, GatewayError> {
        if !self.bindings.is_bound(connection_id) {
            return Err(GatewayError::NotAuthenticated);
        }
        // Unbound between the two calls counts as never bound.
        self.bindings
            .lookup(connection_id)
            .map_err(|_| GatewayError::NotAuthenticated)
    }

    fn ensure_unbound(&self, connection_id: &str) -> Result<(), GatewayError> {
        if self.bindings.is_bound(connection_id) {
            warn!("[Gateway] {} is already logged in", connection_id);
            return Err(BindingError::AlreadyBound {
                connection_id: connection_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn is_logged_in(&self, connection_id: &str) -> bool {
        self.bindings.is_bound(connection_id)
    }

    /// Verify credentials without binding anything
    pub async fn check_login(&self, identifier: &str, password: &str) -> Result<String, GatewayError> {
        Ok(self.storage.check_credentials(identifier, password).await?)
    }

    /// Create an account without binding anything
    pub async fn create_profile(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), GatewayError> {
        Ok(self.storage.create_profile(username, email, password).await?)
    }

    /// Verify credentials and bind the connection to the account
    ///
    /// Returns the account's username.
    pub async fn login(
        &self,
        connection_id: &str,
        identifier: &str,
        password: &str,
    ) -> Result<String, GatewayError> {
        self.ensure_unbound(connection_id)?;
        let username = self.check_login(identifier, password).await?;
        self.bindings.bind(connection_id, &username)?;
        info!("[Gateway] {} logged in as {}", connection_id, username);
        Ok(username)
    }

    /// Create an account and bind the connection to it
    pub async fn register(
        &self,
        connection_id: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), GatewayError> {
        self.ensure_unbound(connection_id)?;
        self.create_profile(username, email, password).await?;
        self.bindings.bind(connection_id, username)?;
        info!("[Gateway] {} registered as {}", connection_id, username);
        Ok(())
    }

    /// Remove the connection's identity; fails if none is bound
    pub fn logout(&self, connection_id: &str) -> Result<(), GatewayError> {
        self.bindings.unbind(connection_id)?;
        info!("[Gateway] {} logged out", connection_id);
        Ok(())
    }

    /// Teardown unbind; an unbound connection is fine
    pub fn release(&self, connection_id: &str) {
        if self.bindings.unbind(connection_id).is_ok() {
            info!("[Gateway] Released identity of {}", connection_id);
        }
    }

    pub async fn send_message(
        &self,
        connection_id: &str,
        receiver: &str,
        text: &str,
    ) -> Result<(), GatewayError> {
        let sender = self.identity(connection_id)?;
        Ok(self.storage.create_message(&sender, receiver, text).await?)
    }

    pub async fn get_messages(
        &self,
        connection_id: &str,
        counterpart: &str,
        since: i64,
    ) -> Result<Vec<Message>, GatewayError> {
        let viewer = self.identity(connection_id)?;
        Ok(self.storage.get_messages(&viewer, counterpart, since).await?)
    }

    pub async fn upload_listing(
        &self,
        connection_id: &str,
        listing: NewListing,
    ) -> Result<i64, GatewayError> {
        let owner = self.identity(connection_id)?;
        Ok(self.storage.upload_listing(&owner, listing).await?)
    }

    pub async fn buy_listing(
        &self,
        connection_id: &str,
        listing_id: i64,
        amount: i64,
    ) -> Result<(), GatewayError> {
        let buyer = self.identity(connection_id)?;
        Ok(self.storage.buy_listing(&buyer, listing_id, amount).await?)
    }

    pub async fn get_listing(
        &self,
        connection_id: &str,
        listing_id: i64,
    ) -> Result<Listing, GatewayError> {
        self.identity(connection_id)?;
        Ok(self.storage.get_listing(listing_id).await?)
    }

    pub async fn get_contacts(&self, connection_id: &str) -> Result<Vec<Contact>, GatewayError> {
        let username = self.identity(connection_id)?;
        Ok(self.storage.get_contacts(&username).await?)
    }
}
