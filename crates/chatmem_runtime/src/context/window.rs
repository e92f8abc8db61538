//! Recency window split and the compaction trigger.

use chatmem_core::{ConversationMemory, Message, MessageId};

use crate::config::CompactionPolicy;

/// Messages partitioned into the compactable prefix and the kept suffix.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarizationWindow {
    pub old_messages: Vec<Message>,
    pub recent_messages: Vec<Message>,
}

impl SummarizationWindow {
    pub fn is_compactable(&self) -> bool {
        !self.old_messages.is_empty()
    }

    pub fn old_ids(&self) -> Vec<MessageId> {
        self.old_messages.iter().map(|m| m.id.clone()).collect()
    }
}

/// Splits on a message boundary: `recent` is the last `k` messages, `old` the rest.
pub fn split_window(messages: &[Message], k: usize) -> SummarizationWindow {
    let cut = messages.len().saturating_sub(k);
    SummarizationWindow {
        old_messages: messages[..cut].to_vec(),
        recent_messages: messages[cut..].to_vec(),
    }
}

/// True when the conversation exceeds both the recency window and the word threshold.
pub fn needs_compaction(conversation: &ConversationMemory, policy: &CompactionPolicy) -> bool {
    conversation.messages.len() > policy.recency_window
        && conversation.total_words > policy.threshold_words
}
