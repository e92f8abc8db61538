use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::words::word_count;

/// Time-ordered message id (UUID v7), so ids sort in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(content: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            is_user,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, true)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, false)
    }

    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = id.into();
        self
    }

    /// Role label used when the message is rendered into a prompt.
    pub fn role_label(&self) -> &'static str {
        if self.is_user {
            "User"
        } else {
            "Assistant"
        }
    }

    pub fn word_count(&self) -> u64 {
        word_count(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_unique() {
        let a = MessageId::new();
        let b = MessageId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_factory_methods() {
        let user = Message::user("hello");
        assert!(user.is_user);
        assert_eq!(user.role_label(), "User");

        let assistant = Message::assistant("hi there");
        assert!(!assistant.is_user);
        assert_eq!(assistant.role_label(), "Assistant");
    }

    #[test]
    fn test_word_count() {
        let msg = Message::user("one two  three");
        assert_eq!(msg.word_count(), 3);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("hello world").with_id("m1");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""id":"m1""#));
        assert!(json.contains(r#""isUser":true"#));

        let decoded: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, msg);
    }
}
