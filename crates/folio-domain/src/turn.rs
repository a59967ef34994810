//! Conversation turns

use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The visitor asking questions
    User,
    /// The engine's reply
    Assistant,
}

impl Role {
    /// Lowercase role name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Immutable once appended to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Author of the message
    pub role: Role,

    /// Message text
    pub text: String,

    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl Turn {
    /// Create a user turn
    pub fn user(text: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp_ms,
        }
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp_ms,
        }
    }

    /// Character volume of the turn, used for session bounds
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
