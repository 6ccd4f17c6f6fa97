//! Chat message entity

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Role of the message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the learner
    User,
    /// Message from the tutor
    Assistant,
    /// System prompt or instruction
    System,
}

impl MessageRole {
    /// Wire name of the role, as expected by chat-completion APIs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

/// A single role/content pair of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the sender
    pub role: MessageRole,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an explicit role
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Parse a message from loosely typed wire fields
    pub fn parse(role: &str, content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::ValidationError(format!(
                "{role} message content cannot be empty"
            )));
        }
        Ok(Self::new(role.parse()?, content))
    }

    /// Number of characters in the content
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_has_correct_role() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn assistant_message_has_correct_role() {
        let msg = ChatMessage::assistant("Hi there!");
        assert_eq!(msg.role, MessageRole::Assistant);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("USER".parse::<MessageRole>().unwrap(), MessageRole::User);
        assert_eq!(
            " assistant ".parse::<MessageRole>().unwrap(),
            MessageRole::Assistant
        );
        assert_eq!("system".parse::<MessageRole>().unwrap(), MessageRole::System);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "tutor".parse::<MessageRole>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidRole(role) if role == "tutor"));
    }

    #[test]
    fn parse_rejects_blank_content() {
        let result = ChatMessage::parse("user", "   ");
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn parse_builds_message() {
        let msg = ChatMessage::parse("assistant", "Good morning").unwrap();
        assert_eq!(msg, ChatMessage::assistant("Good morning"));
    }

    #[test]
    fn serializes_role_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("Be kind")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"Be kind"}"#);
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        assert_eq!(ChatMessage::user("héllo").char_len(), 5);
    }
}
