//! Direct Message Data Structure
//!
//! A message is immutable once stored. It is always presented relative to a
//! viewer: `sent_by_viewer` tells the client which side of the conversation
//! wrote it.

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Maximum number of messages returned by a single page
pub const MESSAGE_PAGE_SIZE: usize = 10;

/// Maximum accepted message body, in characters
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// A direct message as seen by one participant of the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message body
    pub contents: String,
    /// Creation time (Unix milliseconds)
    pub timestamp: i64,
    /// Time the receiver read the message (Unix milliseconds), 0 while unread
    pub read_at: i64,
    /// True when the viewer is the sender
    pub sent_by_viewer: bool,
}

impl Message {
    /// Whether the receiver has read this message
    pub fn is_read(&self) -> bool {
        self.read_at > 0
    }
}

/// Cursor to pass as `since` when asking for the page after `messages`
///
/// Pages are ordered by ascending timestamp, so the cursor is the timestamp
/// of the last message. An empty page has no cursor.
pub fn next_cursor(messages: &[Message]) -> Option<i64> {
    messages.last().map(|message| message.timestamp)
}

/// Check a message body before it is stored
pub fn validate_contents(contents: &str) -> Result<(), SharedError> {
    if contents.trim().is_empty() {
        return Err(SharedError::validation("message", "Message cannot be empty"));
    }
    if contents.chars().count() > MAX_MESSAGE_CHARS {
        return Err(SharedError::validation(
            "message",
            format!("Message cannot exceed {} characters", MAX_MESSAGE_CHARS),
        ));
    }
    Ok(())
}
