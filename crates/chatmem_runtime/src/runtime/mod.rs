//! Conversation controller for chatmem.
//!
//! The controller ties the store, preferences, summarizer, title generator and
//! text generator together around each user action.
//!
//! Split into focused submodules:
//! - **send**: the send sequence (append, compaction, reply)
//! - **lifecycle**: create, select, delete, rename
//! - **status**: ephemeral per-conversation operation flags
//! - **watch**: scratch context subscription
//! - **llm**: provider registry from config

mod lifecycle;
mod llm;
mod send;
mod status;
mod watch;

pub use llm::build_registry;
pub use send::{SendOutcome, TitleOutcome};
pub use status::{ConversationStatus, OperationStatus};
pub use watch::ContextSubscription;

use std::sync::Arc;

use chatmem_core::{ChatEvent, ConversationId, ConversationMemory, Message, SqliteKvStore};
use chatmem_llms::{ProviderTag, TextGenerator};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};

use crate::config::{CompactionPolicy, RuntimeConfig};
use crate::error::Result;
use crate::preferences::Preferences;
use crate::store::ConversationStore;
use crate::summarizer::Summarizer;
use crate::title::TitleGenerator;

/// Word usage of the current conversation against the display ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    pub total_words: u64,
    pub ceiling: u64,
    /// `total_words / ceiling`, capped at 1.0
    pub ratio: f64,
}

impl MemoryUsage {
    pub fn new(total_words: u64, ceiling: u64) -> Self {
        let ratio = if ceiling == 0 {
            1.0
        } else {
            (total_words as f64 / ceiling as f64).min(1.0)
        };
        Self {
            total_words,
            ceiling,
            ratio,
        }
    }

    pub fn percent(&self) -> u8 {
        (self.ratio * 100.0).round() as u8
    }
}

pub struct ConversationController {
    store: Arc<ConversationStore>,
    preferences: Arc<Preferences>,
    generator: Arc<dyn TextGenerator>,
    summarizer: Summarizer,
    titles: Arc<TitleGenerator>,
    policy: CompactionPolicy,
    status: Arc<OperationStatus>,
    event_tx: Option<mpsc::Sender<ChatEvent>>,
    context_watch: Option<ContextSubscription>,
}

impl ConversationController {
    pub fn new(
        store: Arc<ConversationStore>,
        preferences: Arc<Preferences>,
        generator: Arc<dyn TextGenerator>,
        policy: CompactionPolicy,
    ) -> Self {
        Self {
            store,
            preferences,
            summarizer: Summarizer::new(generator.clone()),
            titles: Arc::new(TitleGenerator::new(generator.clone())),
            generator,
            policy,
            status: Arc::new(OperationStatus::default()),
            event_tx: None,
            context_watch: None,
        }
    }

    /// Opens the SQLite store under `config.data_dir` and wires the HTTP providers.
    pub fn open(config: &RuntimeConfig) -> Result<Self> {
        let policy = config.policy()?;
        let kv = Arc::new(SqliteKvStore::open(&config.data_dir)?);
        let store = Arc::new(ConversationStore::load(kv.clone())?);
        let preferences = Arc::new(Preferences::load(kv, config.provider)?);
        let generator: Arc<dyn TextGenerator> = Arc::new(build_registry(config));
        info!(data_dir = %config.data_dir.display(), "conversation controller ready");
        Ok(Self::new(store, preferences, generator, policy))
    }

    /// Streams [`ChatEvent`]s to `tx`. Events are dropped while the channel is full.
    pub fn with_events(mut self, tx: mpsc::Sender<ChatEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Keeps the current conversation's stored context in sync with the
    /// scratch context for as long as the controller lives.
    /// Must be called inside a tokio runtime.
    pub fn with_context_watch(mut self) -> Self {
        self.context_watch = Some(self.watch_context());
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn preferences(&self) -> &Arc<Preferences> {
        &self.preferences
    }

    pub fn policy(&self) -> &CompactionPolicy {
        &self.policy
    }

    pub(crate) fn emit(&self, event: ChatEvent) {
        emit(&self.event_tx, event);
    }

    /// Current conversation, created on first access.
    pub async fn current_conversation(&self) -> Result<ConversationMemory> {
        self.ensure_current().await
    }

    pub async fn messages(&self) -> Result<Vec<Message>> {
        Ok(self.ensure_current().await?.messages)
    }

    /// All conversations, most recently updated first.
    pub async fn conversations(&self) -> Vec<ConversationMemory> {
        self.store.list().await
    }

    pub fn status(&self, id: &ConversationId) -> ConversationStatus {
        self.status.get(id)
    }

    pub async fn memory_usage(&self) -> Result<MemoryUsage> {
        let conversation = self.ensure_current().await?;
        Ok(MemoryUsage::new(conversation.total_words, self.policy.ceiling_words))
    }

    pub fn scratch_context(&self) -> String {
        self.preferences.scratch_context()
    }

    pub fn set_scratch_context(&self, text: &str) -> Result<()> {
        self.preferences.set_scratch_context(text)?;
        Ok(())
    }

    pub fn provider(&self) -> ProviderTag {
        self.preferences.provider()
    }

    pub fn select_provider(&self, provider: ProviderTag) -> Result<()> {
        self.preferences.select_provider(provider)?;
        info!(provider = %provider, "provider selected");
        Ok(())
    }

    pub fn set_credential(&self, provider: ProviderTag, key: &str) -> Result<()> {
        self.preferences.set_credential(provider, key)?;
        Ok(())
    }
}

/// Never waits: a full channel drops the event.
pub(crate) fn emit(tx: &Option<mpsc::Sender<ChatEvent>>, event: ChatEvent) {
    let Some(tx) = tx else {
        return;
    };
    match tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            warn!(conversation_id = %event.conversation_id(), "event channel full, dropping event");
        }
        Err(TrySendError::Closed(_)) => {}
    }
}
