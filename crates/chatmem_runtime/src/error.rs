//! Runtime error types

use chatmem_core::{ConversationId, MemoryError};
use chatmem_llms::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Title is empty")]
    EmptyTitle,

    #[error("Conversation {0} is busy")]
    Busy(ConversationId),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::Busy(ConversationId::from("c1"));
        assert_eq!(err.to_string(), "Conversation c1 is busy");

        let err: RuntimeError = MemoryError::NoCurrentConversation.into();
        assert_eq!(err.to_string(), "Memory error: no current conversation");

        let err: RuntimeError = LlmError::upstream("boom").into();
        assert_eq!(err.to_string(), "LLM error: upstream error: boom");
    }
}
