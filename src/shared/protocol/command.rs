/**
 * Client Commands
 *
 * Every command starts with a text frame holding the command tag. Commands
 * that carry data are followed by a second text frame holding a JSON payload.
 *
 * ```text
 * -> "uploadMessage"
 * -> {"receiver":"bob","message":"hi"}
 * <- {"command":"messageUpload","result":true}
 * ```
 */

use serde::{Deserialize, Serialize};

/// The command tags understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTag {
    Login,
    Registration,
    Logout,
    UploadMessage,
    GetMessages,
    UploadListing,
    BuyListing,
    GetListing,
    GetContacts,
}

impl CommandTag {
    /// All tags, in protocol documentation order
    pub const ALL: [CommandTag; 9] = [
        CommandTag::Login,
        CommandTag::Registration,
        CommandTag::Logout,
        CommandTag::UploadMessage,
        CommandTag::GetMessages,
        CommandTag::UploadListing,
        CommandTag::BuyListing,
        CommandTag::GetListing,
        CommandTag::GetContacts,
    ];

    /// Parse a command frame
    ///
    /// Surrounding whitespace is ignored, as are embedded newlines some
    /// clients append to every frame.
    pub fn parse(frame: &str) -> Option<Self> {
        let normalized = frame.replace('\n', " ");
        let tag = normalized.trim();
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == tag)
    }

    /// Wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Registration => "registration",
            Self::Logout => "logout",
            Self::UploadMessage => "uploadMessage",
            Self::GetMessages => "getMessages",
            Self::UploadListing => "uploadListing",
            Self::BuyListing => "buyListing",
            Self::GetListing => "getListing",
            Self::GetContacts => "getContacts",
        }
    }

    /// Whether a JSON payload frame follows the command frame
    pub fn takes_payload(&self) -> bool {
        !matches!(self, Self::Logout | Self::GetContacts)
    }

    /// Wire name of the result frame this command produces
    pub fn result_name(&self) -> &'static str {
        match self {
            Self::Login => "loginResult",
            Self::Registration => "regResult",
            Self::Logout => "logoutResult",
            Self::UploadMessage => "messageUpload",
            Self::GetMessages => "messagesResult",
            Self::UploadListing => "listingUpload",
            Self::BuyListing => "purchaseResult",
            Self::GetListing => "listingResult",
            Self::GetContacts => "contactsResult",
        }
    }
}

impl std::fmt::Display for CommandTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `login`
///
/// The identifier is the account e-mail address; older clients send it as
/// `username`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginPayload {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

/// Payload of `registration`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Payload of `uploadMessage`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagePayload {
    pub receiver: String,
    pub message: String,
}

/// Payload of `getMessages`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagesQuery {
    pub counterpart: String,
    /// Only messages strictly newer than this timestamp; 0 for the first page
    #[serde(default)]
    pub since: i64,
}

/// Payload of `buyListing`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePayload {
    pub listing_id: i64,
    pub amount: i64,
}

/// Payload of `getListing`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub listing_id: i64,
}
