/**
 * Server Result Frames
 *
 * Every command produces exactly one JSON result frame tagged with the
 * command-specific result name:
 *
 * ```json
 * {"command":"loginResult","result":true,"username":"alice","token":"eyJ..."}
 * {"command":"regResult","responseCode":"EMAIL_IN_USE"}
 * {"command":"purchaseResult","result":false,"error":"ALREADY_SOLD"}
 * ```
 *
 * Failures carry a stable SCREAMING_SNAKE error code in `error`.
 */

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::marketplace::Listing;
use crate::shared::messaging::{Contact, Message};
use crate::shared::protocol::command::CommandTag;

/// Error code for a frame that named no known command
pub const UNKNOWN_COMMAND: &str = "UNKNOWN_COMMAND";

/// Error code for a payload that did not decode for its command
pub const MALFORMED_PAYLOAD: &str = "MALFORMED_PAYLOAD";

/// Error code for a payload that decoded but failed field validation
pub const INVALID_PAYLOAD: &str = "INVALID_PAYLOAD";

/// Outcome of a registration attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationCode {
    Success,
    EmailInUse,
    EmailInvalid,
    PasswordInvalid,
    UsernameInUse,
    UsernameInvalid,
    AlreadyLoggedIn,
    Unknown,
}

/// A result frame sent to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all_fields = "camelCase")]
pub enum ServerFrame {
    #[serde(rename = "loginResult")]
    LoginResult {
        result: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "regResult")]
    RegistrationResult {
        response_code: RegistrationCode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },

    #[serde(rename = "logoutResult")]
    LogoutResult {
        result: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "messageUpload")]
    MessageUpload {
        result: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "messagesResult")]
    MessagesResult {
        result: bool,
        #[serde(default)]
        messages: Vec<Message>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_since: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "listingUpload")]
    ListingUpload {
        result: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "purchaseResult")]
    PurchaseResult {
        result: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "listingResult")]
    ListingResult {
        result: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        listing: Option<Listing>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "contactsResult")]
    ContactsResult {
        result: bool,
        #[serde(default)]
        contacts: Vec<Contact>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename = "unknownCommand")]
    UnknownCommand {
        result: bool,
        error: String,
    },
}

impl ServerFrame {
    /// The failure frame of `tag` carrying `code`
    pub fn failure(tag: CommandTag, code: impl Into<String>) -> Self {
        let error = Some(code.into());
        match tag {
            CommandTag::Login => Self::LoginResult {
                result: false,
                username: None,
                token: None,
                error,
            },
            CommandTag::Registration => Self::RegistrationResult {
                response_code: RegistrationCode::Unknown,
                username: None,
                token: None,
            },
            CommandTag::Logout => Self::LogoutResult { result: false, error },
            CommandTag::UploadMessage => Self::MessageUpload { result: false, error },
            CommandTag::GetMessages => Self::MessagesResult {
                result: false,
                messages: Vec::new(),
                next_since: None,
                error,
            },
            CommandTag::UploadListing => Self::ListingUpload {
                result: false,
                id: None,
                error,
            },
            CommandTag::BuyListing => Self::PurchaseResult { result: false, error },
            CommandTag::GetListing => Self::ListingResult {
                result: false,
                listing: None,
                error,
            },
            CommandTag::GetContacts => Self::ContactsResult {
                result: false,
                contacts: Vec::new(),
                error,
            },
        }
    }

    /// The frame sent for a command tag nobody recognises
    pub fn unknown_command() -> Self {
        Self::UnknownCommand {
            result: false,
            error: UNKNOWN_COMMAND.to_string(),
        }
    }

    /// Wire name of this frame
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginResult { .. } => "loginResult",
            Self::RegistrationResult { .. } => "regResult",
            Self::LogoutResult { .. } => "logoutResult",
            Self::MessageUpload { .. } => "messageUpload",
            Self::MessagesResult { .. } => "messagesResult",
            Self::ListingUpload { .. } => "listingUpload",
            Self::PurchaseResult { .. } => "purchaseResult",
            Self::ListingResult { .. } => "listingResult",
            Self::ContactsResult { .. } => "contactsResult",
            Self::UnknownCommand { .. } => "unknownCommand",
        }
    }

    /// Whether the command this frame answers succeeded
    pub fn is_success(&self) -> bool {
        match self {
            Self::RegistrationResult { response_code, .. } => {
                *response_code == RegistrationCode::Success
            }
            Self::LoginResult { result, .. }
            | Self::LogoutResult { result, .. }
            | Self::MessageUpload { result, .. }
            | Self::MessagesResult { result, .. }
            | Self::ListingUpload { result, .. }
            | Self::PurchaseResult { result, .. }
            | Self::ListingResult { result, .. }
            | Self::ContactsResult { result, .. }
            | Self::UnknownCommand { result, .. } => *result,
        }
    }

    /// Encode as a JSON text frame
    pub fn to_text(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
