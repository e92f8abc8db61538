use std::collections::HashSet;

use chatmem_constant::defaults::DEFAULT_TITLE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, Result};
use crate::message::{Message, MessageId};
use crate::words::word_count;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Persisted state of one conversation.
///
/// `total_words` is a cached projection of `summary` plus every message body;
/// [`ConversationMemory::recount`] recomputes it from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMemory {
    pub id: ConversationId,
    pub title: String,
    pub context: String,
    pub summary: String,
    pub messages: Vec<Message>,
    pub total_words: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_summarized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationMemory {
    pub fn new(context: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            title: DEFAULT_TITLE.to_string(),
            context: context.into(),
            summary: String::new(),
            messages: Vec::new(),
            total_words: 0,
            last_summarized_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Appends a message and bumps the cached word count.
    pub fn add_message(&mut self, message: Message) -> Result<()> {
        if self.contains_message(&message.id) {
            return Err(MemoryError::DuplicateMessage(message.id.to_string()));
        }
        self.total_words += message.word_count();
        self.messages.push(message);
        self.touch();
        Ok(())
    }

    pub fn contains_message(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| &m.id == id)
    }

    /// Replaces the compacted messages with `summary`.
    ///
    /// Messages whose ids are not in `compacted` stay in place, in order.
    /// Returns false and changes nothing if any id is not one of this
    /// conversation's messages.
    pub fn compact(&mut self, summary: impl Into<String>, compacted: &[MessageId]) -> bool {
        if !compacted.iter().all(|id| self.contains_message(id)) {
            return false;
        }
        let compacted: HashSet<&MessageId> = compacted.iter().collect();
        self.messages.retain(|m| !compacted.contains(&m.id));
        self.summary = summary.into();
        let now = Utc::now();
        self.last_summarized_at = Some(now);
        self.updated_at = now;
        self.refresh_word_count();
        true
    }

    /// Word count recomputed from the summary and every message.
    pub fn recount(&self) -> u64 {
        word_count(&self.summary) + self.messages.iter().map(Message::word_count).sum::<u64>()
    }

    pub fn refresh_word_count(&mut self) {
        self.total_words = self.recount();
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_new() {
        let id = ConversationId::new();
        assert!(!id.0.is_empty());
        assert_eq!(id.as_str().len(), 36);
    }

    #[test]
    fn test_conversation_id_display() {
        let id = ConversationId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_conversation_new() {
        let conv = ConversationMemory::new("be brief");
        assert_eq!(conv.title, "New Chat");
        assert_eq!(conv.context, "be brief");
        assert!(conv.summary.is_empty());
        assert!(conv.is_empty());
        assert_eq!(conv.total_words, 0);
        assert!(conv.last_summarized_at.is_none());
        assert!(conv.has_default_title());
    }

    #[test]
    fn test_add_message_counts_words() {
        let mut conv = ConversationMemory::new("");
        conv.add_message(Message::user("Hello")).unwrap();
        conv.add_message(Message::assistant("Hi, how can I help?")).unwrap();
        assert_eq!(conv.message_count(), 2);
        assert_eq!(conv.total_words, 6);
        assert_eq!(conv.total_words, conv.recount());
    }

    #[test]
    fn test_add_message_rejects_duplicate_id() {
        let mut conv = ConversationMemory::new("");
        conv.add_message(Message::user("one").with_id("m1")).unwrap();
        let err = conv.add_message(Message::user("two").with_id("m1")).unwrap_err();
        assert!(matches!(err, MemoryError::DuplicateMessage(id) if id == "m1"));
        assert_eq!(conv.message_count(), 1);
        assert_eq!(conv.total_words, 1);
    }

    #[test]
    fn test_compact_keeps_unlisted_messages() {
        let mut conv = ConversationMemory::new("");
        for i in 0..5 {
            conv.add_message(Message::user(format!("message {}", i)).with_id(format!("m{}", i).as_str()))
                .unwrap();
        }
        let compacted: Vec<MessageId> = vec!["m0".into(), "m1".into(), "m2".into()];
        assert!(conv.compact("earlier we said hello", &compacted));

        let ids: Vec<&str> = conv.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m4"]);
        assert_eq!(conv.summary, "earlier we said hello");
        assert_eq!(conv.total_words, 4 + 4);
        assert!(conv.last_summarized_at.is_some());
    }

    #[test]
    fn test_compact_rejects_foreign_ids() {
        let mut conv = ConversationMemory::new("");
        conv.add_message(Message::user("alpha one").with_id("a1")).unwrap();
        conv.add_message(Message::user("alpha two").with_id("a2")).unwrap();
        let before = conv.clone();

        let compacted: Vec<MessageId> = vec!["a1".into(), "b1".into()];
        assert!(!conv.compact("summary of someone else", &compacted));
        assert_eq!(conv, before);
    }

    #[test]
    fn test_conversation_serialization() {
        let mut conv = ConversationMemory::new("ctx").with_title("Rust questions");
        conv.add_message(Message::user("what is a trait")).unwrap();

        let json = serde_json::to_string(&conv).unwrap();
        assert!(json.contains(r#""totalWords":4"#));
        assert!(!json.contains("lastSummarizedAt"));

        let decoded: ConversationMemory = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, conv);
    }
}
