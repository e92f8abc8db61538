pub mod config;
pub mod context;
pub mod error;
pub mod preferences;
pub mod runtime;
pub mod store;
pub mod summarizer;
pub mod title;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{CompactionPolicy, RuntimeConfig};
pub use error::{Result, RuntimeError};
pub use preferences::Preferences;
pub use runtime::{
    build_registry, ContextSubscription, ConversationController, ConversationStatus, MemoryUsage,
    SendOutcome, TitleOutcome,
};
pub use store::{Compaction, ConversationStore};
pub use summarizer::{Summarizer, Summary, SummaryRequest};
pub use title::{fallback_title, TitleGenerator};
