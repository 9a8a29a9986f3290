/**
 * Backend Error Types
 *
 * Errors raised by the HTTP side of the server: the session cookie endpoints
 * and the health check. Each one maps to an HTTP status code.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Problems with the request itself:
 * - Missing session cookie
 *
 * ## Token Errors
 *
 * - Signature, format or expiry failures (401)
 * - Refresh requested too early (400)
 *
 * ## Hub Errors
 *
 * The connection hub has stopped (503).
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::TokenError;
use crate::backend::realtime::HubError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use conduit::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::UNAUTHORIZED, "No session cookie");
/// assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing cookie, invalid body)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Session token error
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Connection hub error
    #[error(transparent)]
    Hub(#[from] HubError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Token::Invalid` - 401 Unauthorized
    /// - `Token::NotDueForRefresh` - 400 Bad Request
    /// - `Hub::Closed` - 503 Service Unavailable
    /// - `Hub::MultilinePayload` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Token(TokenError::Invalid(_)) => StatusCode::UNAUTHORIZED,
            Self::Token(TokenError::NotDueForRefresh { .. }) => StatusCode::BAD_REQUEST,
            Self::Hub(HubError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Hub(HubError::MultilinePayload) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
