//! Chat message types (OpenAI-compatible role/content pairs).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered chat transcript. Entries are only ever appended.
pub type Conversation = Vec<ChatMessage>;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Setup instructions.
    System,
    /// Game observations and user input.
    User,
    /// Moves produced by the acting model.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in chat format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl ChatMessage {
    /// Build a message from role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// System message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// User message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Wrap a game observation as a user message. Empty observations yield `None`.
    #[must_use]
    pub fn observation(observation: String) -> Option<Self> {
        if observation.is_empty() {
            None
        } else {
            Some(Self::user(observation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_observation_is_dropped() {
        assert!(ChatMessage::observation(String::new()).is_none());
        let msg = ChatMessage::observation("board".to_string());
        assert_eq!(msg, Some(ChatMessage::user("board")));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("move")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"move"}"#);
        assert_eq!(Role::parse("system"), Some(Role::System));
        assert_eq!(Role::parse("tool"), None);
    }
}
