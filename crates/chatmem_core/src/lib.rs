pub mod conversation;
pub mod db;
pub mod error;
pub mod event;
pub mod message;
pub mod words;

pub use conversation::{ConversationId, ConversationMemory};
pub use db::{KvStore, KvWrite, MemoryKvStore, SqliteKvStore};
pub use error::{MemoryError, Result};
pub use event::{ChatEvent, NoticeKind, OperationState, SystemNotice};
pub use message::{Message, MessageId};
pub use words::word_count;
