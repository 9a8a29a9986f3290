//! Authentication Module
//!
//! This module handles identity for live connections and for HTTP clients.
//!
//! # Architecture
//!
//! The auth module is organized into focused submodules:
//!
//! - **`bindings`** - Connection id → username table
//! - **`sessions`** - JWT token generation, validation and cookie helpers
//! - **`password`** - bcrypt password hashing
//! - **`validation`** - Registration field checks
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs        - Module exports and documentation
//! ├── bindings.rs   - Identity binding table
//! ├── sessions.rs   - JWT token management
//! ├── password.rs   - Password hashing
//! └── validation.rs - Username, e-mail and password rules
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Registration**: fields validated → profile created → connection bound → token returned
//! 2. **Login**: credentials verified → connection bound → token returned
//! 3. **Logout**: binding removed; the HTTP cookie is cleared separately
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - A connection can hold only one identity; a second login is rejected
//! - Tokens expire after 24 hours and refresh only in their last 30 minutes

/// Connection identity bindings
pub mod bindings;

/// JWT token generation and validation
pub mod sessions;

/// Password hashing
pub mod password;

/// Registration validation
pub mod validation;

pub use bindings::{BindingError, IdentityBindingTable};
pub use password::{PasswordError, PasswordHasher};
pub use sessions::{Claims, IssuedToken, TokenError, TokenIssuer};
