/**
 * Password Hashing
 *
 * Thin wrapper over bcrypt so storage adapters never touch the hashing
 * primitive directly. The cost is configurable: production keeps bcrypt's
 * default, tests use the minimum to stay fast.
 */

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use thiserror::Error;

/// Lowest cost bcrypt accepts
pub const MIN_COST: u32 = 4;

/// Hashing failures
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error(transparent)]
    Bcrypt(#[from] BcryptError),

    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hashes and verifies passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (clamped to 4..=31)
    pub fn with_cost(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, 31),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password for storage
    pub fn hash(&self, password: &str) -> Result<String, BcryptError> {
        hash(password, self.cost)
    }

    /// Check a password against a stored hash
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool, BcryptError> {
        verify(password, password_hash)
    }

    /// `hash` on the blocking pool
    pub async fn hash_async(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = *self;
        let password = password.to_string();
        Ok(tokio::task::spawn_blocking(move || hasher.hash(&password)).await??)
    }

    /// `verify` on the blocking pool
    pub async fn verify_async(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordError> {
        let hasher = *self;
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash)).await??)
    }
}
