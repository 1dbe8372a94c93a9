//! Conversation message model.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The end user.
    User,
    /// The assistant.
    Assistant,
}

impl Role {
    /// Wire name of the role, as sent to the model backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry in a conversation history.
///
/// Immutable once appended, except the trailing assistant message of an
/// in-flight exchange, which grows as tokens stream in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered per-user conversation history.
pub type ConversationHistory = Vec<Message>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let history: ConversationHistory =
            vec![Message::user("Hello"), Message::assistant("Hi there")];
        let json = serde_json::to_string(&history).unwrap();
        let back: ConversationHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(history, back);
    }

    #[test]
    fn roles_use_wire_names() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
