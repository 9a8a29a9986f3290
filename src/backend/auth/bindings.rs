/**
 * Identity Binding Table
 *
 * Maps a live connection id to the username it authenticated as. A
 * connection holds at most one identity at a time: binding an already bound
 * connection is rejected and the existing binding is left untouched.
 *
 * # Thread Safety
 *
 * The table is shared by every connection worker. It is guarded by a
 * `std::sync::RwLock`: lookups run concurrently, bind/unbind are exclusive.
 * The lock is never held across an `.await`, so storage calls made after a
 * lookup never block other connections.
 */

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

/// Misuse of the binding table
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The connection already has an authenticated identity
    #[error("connection {connection_id} is already bound to an identity")]
    AlreadyBound { connection_id: String },

    /// The connection has no authenticated identity
    #[error("connection {connection_id} is not bound to an identity")]
    NotBound { connection_id: String },
}

/// Connection id → username
#[derive(Debug, Default)]
pub struct IdentityBindingTable {
    bindings: RwLock<HashMap<String, String>>,
}

impl IdentityBindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-written:
    // every mutation is a single insert or remove.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.bindings.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that `connection_id` is authenticated as `username`
    ///
    /// # Errors
    ///
    /// `AlreadyBound` if the connection already has an identity; the prior
    /// binding is unchanged.
    pub fn bind(&self, connection_id: &str, username: &str) -> Result<(), BindingError> {
        let mut bindings = self.write();
        if bindings.contains_key(connection_id) {
            return Err(BindingError::AlreadyBound {
                connection_id: connection_id.to_string(),
            });
        }
        bindings.insert(connection_id.to_string(), username.to_string());
        tracing::debug!("[Bindings] {} bound to {}", connection_id, username);
        Ok(())
    }

    /// Whether `connection_id` has an identity
    pub fn is_bound(&self, connection_id: &str) -> bool {
        self.read().contains_key(connection_id)
    }

    /// The username bound to `connection_id`
    pub fn lookup(&self, connection_id: &str) -> Result<String, BindingError> {
        self.read()
            .get(connection_id)
            .cloned()
            .ok_or_else(|| BindingError::NotBound {
                connection_id: connection_id.to_string(),
            })
    }

    /// Remove the identity of `connection_id`
    pub fn unbind(&self, connection_id: &str) -> Result<(), BindingError> {
        match self.write().remove(connection_id) {
            Some(username) => {
                tracing::debug!("[Bindings] {} unbound from {}", connection_id, username);
                Ok(())
            }
            None => Err(BindingError::NotBound {
                connection_id: connection_id.to_string(),
            }),
        }
    }

    /// Number of authenticated connections
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
