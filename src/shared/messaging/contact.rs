//! Contact Data Structure
//!
//! A contact is derived from message history: every distinct user the viewer
//! has exchanged at least one message with.

use serde::{Deserialize, Serialize};

/// A counterpart in the viewer's message history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Counterpart's username
    pub username: String,
    /// Avatar URL stored on the account, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Contact {
    /// Create a contact without an avatar
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            avatar_url: None,
        }
    }
}
