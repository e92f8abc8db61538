//! Scratch context subscription.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ConversationController;

/// Background task reconciling the current conversation's stored context with
/// the scratch context. Aborted on drop.
#[derive(Debug)]
pub struct ContextSubscription {
    handle: JoinHandle<()>,
}

impl Drop for ContextSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl ConversationController {
    /// Subscribes to scratch context changes. Must be called inside a tokio runtime.
    pub fn watch_context(&self) -> ContextSubscription {
        let mut rx = self.preferences.subscribe_context();
        let store = self.store.clone();
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let context = rx.borrow_and_update().clone();
                let Some(id) = store.current_id().await else {
                    continue;
                };
                match store.set_context(&id, &context).await {
                    Ok(()) => debug!(conversation_id = %id, "conversation context reconciled"),
                    Err(e) => warn!(conversation_id = %id, error = %e, "could not store context"),
                }
            }
        });
        ContextSubscription { handle }
    }
}
