//! Conversation lifecycle: lazy creation, switching, deletion and renaming.

use chatmem_core::{ChatEvent, ConversationId, ConversationMemory};
use tracing::{info, warn};

use crate::error::{Result, RuntimeError};

use super::ConversationController;

impl ConversationController {
    /// Returns the current conversation, creating one seeded with the saved
    /// scratch context if there is none.
    pub(crate) async fn ensure_current(&self) -> Result<ConversationMemory> {
        let context = self.preferences.scratch_context();
        let (conversation, created) = self.store.current_or_create(&context).await?;
        if created {
            self.announce_created(&conversation);
        }
        Ok(conversation)
    }

    pub async fn new_conversation(&self) -> Result<ConversationMemory> {
        let context = self.preferences.scratch_context();
        let conversation = self.store.create(&context).await?;
        self.announce_created(&conversation);
        Ok(conversation)
    }

    fn announce_created(&self, conversation: &ConversationMemory) {
        info!(conversation_id = %conversation.id, "new conversation");
        self.emit(ChatEvent::ConversationCreated {
            conversation_id: conversation.id.clone(),
        });
    }

    /// Switches to `id`. An unknown id starts a new conversation instead.
    pub async fn select_conversation(&self, id: &ConversationId) -> Result<ConversationMemory> {
        match self.store.switch_to(id).await? {
            Some(conversation) => {
                self.emit(ChatEvent::ConversationSwitched {
                    conversation_id: conversation.id.clone(),
                });
                Ok(conversation)
            }
            None => {
                warn!(conversation_id = %id, "unknown conversation, starting a new one");
                self.new_conversation().await
            }
        }
    }

    /// Deletes `id`. Deleting the current conversation creates its replacement,
    /// which is returned.
    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<Option<ConversationMemory>> {
        let was_current = self.store.current_id().await.as_ref() == Some(id);
        if !self.store.delete(id).await? {
            return Ok(None);
        }
        self.emit(ChatEvent::ConversationDeleted {
            conversation_id: id.clone(),
        });
        if was_current {
            return self.new_conversation().await.map(Some);
        }
        Ok(None)
    }

    pub async fn rename_conversation(&self, id: &ConversationId, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(RuntimeError::EmptyTitle);
        }
        self.store.update_title(id, title).await?;
        if self.store.get(id).await.is_some() {
            self.emit(ChatEvent::title_updated(id.clone(), title));
        }
        Ok(())
    }
}
