//! Ephemeral per-conversation operation flags. Never persisted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chatmem_core::{ConversationId, OperationState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationStatus {
    pub state: OperationState,
    pub generating_title: bool,
}

impl ConversationStatus {
    fn is_idle(&self) -> bool {
        !self.state.is_busy() && !self.generating_title
    }
}

#[derive(Debug, Default)]
pub struct OperationStatus {
    inner: Mutex<HashMap<ConversationId, ConversationStatus>>,
}

impl OperationStatus {
    fn map(&self) -> MutexGuard<'_, HashMap<ConversationId, ConversationStatus>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, id: &ConversationId) -> ConversationStatus {
        self.map().get(id).copied().unwrap_or_default()
    }

    /// Marks `id` as sending. False if a send is already in flight.
    pub fn try_begin_send(&self, id: &ConversationId) -> bool {
        let mut map = self.map();
        let entry = map.entry(id.clone()).or_default();
        if entry.state.is_busy() {
            return false;
        }
        entry.state = OperationState::Sending;
        true
    }

    pub fn set_state(&self, id: &ConversationId, state: OperationState) {
        self.update(id, |s| s.state = state);
    }

    /// Marks title generation as running. False if it already is.
    pub fn try_begin_title(&self, id: &ConversationId) -> bool {
        let mut map = self.map();
        let entry = map.entry(id.clone()).or_default();
        if entry.generating_title {
            return false;
        }
        entry.generating_title = true;
        true
    }

    fn update(&self, id: &ConversationId, f: impl FnOnce(&mut ConversationStatus)) {
        let mut map = self.map();
        let entry = map.entry(id.clone()).or_default();
        f(entry);
        if entry.is_idle() {
            map.remove(id);
        }
    }
}

/// Returns the conversation to `Idle` when dropped.
pub(crate) struct SendGuard {
    status: Arc<OperationStatus>,
    id: ConversationId,
}

impl SendGuard {
    pub(crate) fn new(status: Arc<OperationStatus>, id: ConversationId) -> Self {
        Self { status, id }
    }
}

impl Drop for SendGuard {
    fn drop(&mut self) {
        self.status.set_state(&self.id, OperationState::Idle);
    }
}

/// Clears `generating_title` when dropped.
pub(crate) struct TitleGuard {
    status: Arc<OperationStatus>,
    id: ConversationId,
}

impl TitleGuard {
    pub(crate) fn new(status: Arc<OperationStatus>, id: ConversationId) -> Self {
        Self { status, id }
    }
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        self.status.update(&self.id, |s| s.generating_title = false);
    }
}
