use thiserror::Error;

use crate::conversation::ConversationId;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("no current conversation")]
    NoCurrentConversation,

    #[error("duplicate message id: {0}")]
    DuplicateMessage(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
