/**
 * Session Tokens
 *
 * This module handles JWT token generation and validation for user sessions.
 * Tokens are HS256-signed, carry the username as `sub`, and expire after
 * 24 hours. A token may only be refreshed during the last 30 minutes of its
 * life.
 *
 * Tokens travel to the browser as an HTTP-only cookie named `token`; the
 * helpers at the bottom of this module build and parse that cookie.
 */

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token lifetime in seconds (24 hours)
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// A token is refreshable once it expires within this many seconds
pub const REFRESH_WINDOW_SECS: i64 = 30 * 60;

/// Name of the session cookie
pub const COOKIE_NAME: &str = "token";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Token failures
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature, format or expiry check failed
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The token is valid but too far from expiry to be refreshed
    #[error("token expires in {remaining_secs}s; refresh is only allowed in its last 30 minutes")]
    NotDueForRefresh { remaining_secs: i64 },
}

/// A freshly signed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Expiration time (Unix timestamp)
    pub expires_at: i64,
}

/// Signs and verifies session tokens with a shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs: TOKEN_TTL_SECS,
        }
    }

    /// Create a token for `username`, valid for 24 hours from now
    pub fn issue(&self, username: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(username, Utc::now().timestamp())
    }

    /// Create a token for `username` as if issued at `now`
    pub fn issue_at(&self, username: &str, now: i64) -> Result<IssuedToken, TokenError> {
        let claims = Claims {
            sub: username.to_string(),
            exp: now + self.ttl_secs,
            iat: now,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Verify and decode a token
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Re-issue a token that is within the refresh window
    ///
    /// # Errors
    ///
    /// - `Invalid` if the token does not verify
    /// - `NotDueForRefresh` if it expires more than 30 minutes from now
    pub fn refresh(&self, token: &str) -> Result<IssuedToken, TokenError> {
        let claims = self.verify(token)?;
        let now = Utc::now().timestamp();
        let remaining_secs = claims.exp - now;
        if remaining_secs > REFRESH_WINDOW_SECS {
            return Err(TokenError::NotDueForRefresh { remaining_secs });
        }
        self.issue_at(&claims.sub, now)
    }
}

/// `Set-Cookie` value delivering `token` as an HTTP-only session cookie
pub fn session_cookie(issued: &IssuedToken) -> String {
    let expires = DateTime::<Utc>::from_timestamp(issued.expires_at, 0)
        .unwrap_or_else(Utc::now)
        .format("%a, %d %b %Y %H:%M:%S GMT");
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Expires={}",
        COOKIE_NAME, issued.token, expires
    )
}

/// `Set-Cookie` value that deletes the session cookie
pub fn cleared_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        COOKIE_NAME
    )
}

/// Extract the session token from a `Cookie` request header
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
