//! Durable conversation index with a current-conversation pointer.
//!
//! Every mutation builds the next index on a copy, persists the index and the
//! pointer in one `set_many` batch, and only then swaps the copy in. A failed
//! write leaves both the durable and the in-memory state untouched.

use std::collections::HashMap;
use std::sync::Arc;

use chatmem_constant::keys;
use chatmem_core::{ConversationId, ConversationMemory, KvStore, MemoryError, Message, MessageId};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::config::CompactionPolicy;
use crate::context::{needs_compaction, split_window, SummarizationWindow};

type MemoryResult<T> = std::result::Result<T, MemoryError>;

/// Summary that replaces a set of compacted messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Compaction {
    pub summary: String,
    pub compacted: Vec<MessageId>,
}

#[derive(Debug, Clone, Default)]
struct IndexState {
    conversations: HashMap<ConversationId, ConversationMemory>,
    current: Option<ConversationId>,
}

impl IndexState {
    fn current(&self) -> Option<&ConversationMemory> {
        self.current.as_ref().and_then(|id| self.conversations.get(id))
    }

    fn current_mut(&mut self) -> Option<&mut ConversationMemory> {
        let id = self.current.clone()?;
        self.conversations.get_mut(&id)
    }
}

pub struct ConversationStore {
    kv: Arc<dyn KvStore>,
    state: Mutex<IndexState>,
}

impl ConversationStore {
    /// Loads the index from `kv`. A pointer to a missing conversation is dropped.
    pub fn load(kv: Arc<dyn KvStore>) -> MemoryResult<Self> {
        let conversations: HashMap<ConversationId, ConversationMemory> =
            match kv.get(keys::CONVERSATIONS)? {
                Some(bytes) => serde_json::from_slice(&bytes)?,
                None => HashMap::new(),
            };

        let mut current = kv
            .get_string(keys::CURRENT_CONVERSATION)?
            .filter(|s| !s.is_empty())
            .map(ConversationId::from);
        if let Some(id) = &current {
            if !conversations.contains_key(id) {
                warn!(conversation_id = %id, "current pointer references a missing conversation, clearing");
                current = None;
            }
        }

        debug!(count = conversations.len(), current = ?current, "loaded conversation index");
        Ok(Self {
            kv,
            state: Mutex::new(IndexState {
                conversations,
                current,
            }),
        })
    }

    /// Persists `next` and publishes it. On failure nothing changes.
    fn commit(&self, state: &mut MutexGuard<'_, IndexState>, next: IndexState) -> MemoryResult<()> {
        let index = serde_json::to_vec(&next.conversations)?;
        let pointer = next.current.as_ref().map(|id| id.as_str().as_bytes().to_vec());
        self.kv.set_many(vec![
            (keys::CONVERSATIONS.to_string(), Some(index)),
            (keys::CURRENT_CONVERSATION.to_string(), pointer),
        ])?;
        **state = next;
        Ok(())
    }

    pub async fn current(&self) -> Option<ConversationMemory> {
        self.state.lock().await.current().cloned()
    }

    pub async fn current_id(&self) -> Option<ConversationId> {
        self.state.lock().await.current.clone()
    }

    pub async fn get(&self, id: &ConversationId) -> Option<ConversationMemory> {
        self.state.lock().await.conversations.get(id).cloned()
    }

    /// All conversations, most recently updated first.
    pub async fn list(&self) -> Vec<ConversationMemory> {
        let state = self.state.lock().await;
        let mut all: Vec<ConversationMemory> = state.conversations.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| b.created_at.cmp(&a.created_at)));
        all
    }

    /// Creates a conversation and makes it current.
    pub async fn create(&self, context: &str) -> MemoryResult<ConversationMemory> {
        let mut state = self.state.lock().await;
        self.insert_current(&mut state, context)
    }

    /// Returns the current conversation, creating it first if there is none.
    /// The flag is true when a conversation was created.
    pub async fn current_or_create(&self, context: &str) -> MemoryResult<(ConversationMemory, bool)> {
        let mut state = self.state.lock().await;
        if let Some(conversation) = state.current() {
            return Ok((conversation.clone(), false));
        }
        self.insert_current(&mut state, context).map(|c| (c, true))
    }

    fn insert_current(
        &self,
        state: &mut MutexGuard<'_, IndexState>,
        context: &str,
    ) -> MemoryResult<ConversationMemory> {
        let conversation = ConversationMemory::new(context);
        let mut next = (**state).clone();
        next.conversations.insert(conversation.id.clone(), conversation.clone());
        next.current = Some(conversation.id.clone());
        self.commit(state, next)?;
        debug!(conversation_id = %conversation.id, "created conversation");
        Ok(conversation)
    }

    /// Overwrites a conversation by id. The cached word count is recomputed.
    pub async fn update(&self, conversation: ConversationMemory) -> MemoryResult<()> {
        let mut state = self.state.lock().await;
        if !state.conversations.contains_key(&conversation.id) {
            return Err(MemoryError::NotFound(conversation.id));
        }
        let mut conversation = conversation;
        conversation.refresh_word_count();
        let mut next = state.clone();
        next.conversations.insert(conversation.id.clone(), conversation);
        self.commit(&mut state, next)
    }

    /// Appends to the current conversation.
    pub async fn add_message(&self, message: Message) -> MemoryResult<ConversationId> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let conversation = next.current_mut().ok_or(MemoryError::NoCurrentConversation)?;
        conversation.add_message(message)?;
        let id = conversation.id.clone();
        self.commit(&mut state, next)?;
        Ok(id)
    }

    /// Appends to a specific conversation, current or not.
    pub async fn append_to(&self, id: &ConversationId, message: Message) -> MemoryResult<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let conversation = next
            .conversations
            .get_mut(id)
            .ok_or_else(|| MemoryError::NotFound(id.clone()))?;
        conversation.add_message(message)?;
        self.commit(&mut state, next)
    }

    /// Appends only if `id` is still the current conversation.
    pub async fn append_if_current(&self, id: &ConversationId, message: Message) -> MemoryResult<bool> {
        let mut state = self.state.lock().await;
        if state.current.as_ref() != Some(id) {
            return Ok(false);
        }
        let mut next = state.clone();
        match next.conversations.get_mut(id) {
            Some(conversation) => conversation.add_message(message)?,
            None => return Ok(false),
        }
        self.commit(&mut state, next)?;
        Ok(true)
    }

    /// Sets a title. Unknown ids are ignored.
    pub async fn update_title(&self, id: &ConversationId, title: &str) -> MemoryResult<()> {
        self.modify(id, |c| {
            c.title = title.to_string();
            true
        })
        .await
        .map(|_| ())
    }

    /// Sets a generated title unless the conversation was renamed meanwhile.
    pub async fn update_title_if_default(&self, id: &ConversationId, title: &str) -> MemoryResult<bool> {
        self.modify(id, |c| {
            if !c.has_default_title() {
                return false;
            }
            c.title = title.to_string();
            true
        })
        .await
    }

    /// Replaces a conversation's stored scratch context. Unknown ids are ignored.
    pub async fn set_context(&self, id: &ConversationId, context: &str) -> MemoryResult<()> {
        self.modify(id, |c| {
            if c.context == context {
                return false;
            }
            c.context = context.to_string();
            true
        })
        .await
        .map(|_| ())
    }

    async fn modify<F>(&self, id: &ConversationId, f: F) -> MemoryResult<bool>
    where
        F: FnOnce(&mut ConversationMemory) -> bool,
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let changed = match next.conversations.get_mut(id) {
            Some(conversation) => {
                let changed = f(conversation);
                if changed {
                    conversation.touch();
                }
                changed
            }
            None => false,
        };
        if changed {
            self.commit(&mut state, next)?;
        }
        Ok(changed)
    }

    /// Moves the pointer to `id`. Unknown ids return `None` and leave the pointer alone.
    pub async fn switch_to(&self, id: &ConversationId) -> MemoryResult<Option<ConversationMemory>> {
        let mut state = self.state.lock().await;
        let Some(conversation) = state.conversations.get(id).cloned() else {
            return Ok(None);
        };
        if state.current.as_ref() != Some(id) {
            let mut next = state.clone();
            next.current = Some(id.clone());
            self.commit(&mut state, next)?;
        }
        Ok(Some(conversation))
    }

    /// Removes a conversation. Deleting the current one clears the pointer.
    pub async fn delete(&self, id: &ConversationId) -> MemoryResult<bool> {
        let mut state = self.state.lock().await;
        if !state.conversations.contains_key(id) {
            return Ok(false);
        }
        let mut next = state.clone();
        next.conversations.remove(id);
        if next.current.as_ref() == Some(id) {
            next.current = None;
        }
        self.commit(&mut state, next)?;
        debug!(conversation_id = %id, "deleted conversation");
        Ok(true)
    }

    /// Splits the messages of `id`, whether or not it is current.
    pub async fn messages_for_summarization(
        &self,
        id: &ConversationId,
        k: usize,
    ) -> MemoryResult<SummarizationWindow> {
        let state = self.state.lock().await;
        let conversation = state
            .conversations
            .get(id)
            .ok_or_else(|| MemoryError::NotFound(id.clone()))?;
        Ok(split_window(&conversation.messages, k))
    }

    pub async fn needs_summarization(&self, id: &ConversationId, policy: &CompactionPolicy) -> bool {
        let state = self.state.lock().await;
        state
            .conversations
            .get(id)
            .map(|c| needs_compaction(c, policy))
            .unwrap_or(false)
    }

    /// Applies a compaction if `id` is still current and owns every compacted
    /// message. Returns whether it was applied.
    pub async fn apply_summary(&self, id: &ConversationId, compaction: &Compaction) -> MemoryResult<bool> {
        let mut state = self.state.lock().await;
        if state.current.as_ref() != Some(id) {
            return Ok(false);
        }
        let mut next = state.clone();
        let Some(conversation) = next.conversations.get_mut(id) else {
            return Ok(false);
        };
        if !conversation.compact(compaction.summary.clone(), &compaction.compacted) {
            warn!(conversation_id = %id, "compaction names messages outside the conversation, dropped");
            return Ok(false);
        }
        self.commit(&mut state, next)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmem_core::{KvWrite, MemoryKvStore, SqliteKvStore};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn memory_store() -> (ConversationStore, Arc<MemoryKvStore>) {
        let kv = Arc::new(MemoryKvStore::new());
        let store = ConversationStore::load(kv.clone()).unwrap();
        (store, kv)
    }

    /// KV that fails writes once `fail` is set.
    struct FlakyKv {
        inner: MemoryKvStore,
        fail: AtomicBool,
    }

    impl KvStore for FlakyKv {
        fn get(&self, key: &str) -> MemoryResult<Option<Vec<u8>>> {
            self.inner.get(key)
        }

        fn set_many(&self, writes: Vec<KvWrite>) -> MemoryResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(MemoryError::Storage("disk full".into()));
            }
            self.inner.set_many(writes)
        }
    }

    #[tokio::test]
    async fn test_lazy_empty_store() {
        let (store, _) = memory_store();
        assert!(store.current().await.is_none());
        assert!(store.list().await.is_empty());
        assert!(matches!(
            store.add_message(Message::user("hi")).await,
            Err(MemoryError::NoCurrentConversation)
        ));
        assert!(!store
            .needs_summarization(&ConversationId::from("none"), &CompactionPolicy::default())
            .await);
    }

    #[tokio::test]
    async fn test_create_becomes_current_and_persists() {
        let (store, kv) = memory_store();
        let conv = store.create("scratch").await.unwrap();
        assert_eq!(conv.title, "New Chat");
        assert_eq!(store.current_id().await, Some(conv.id.clone()));

        assert_eq!(
            kv.get_string(keys::CURRENT_CONVERSATION).unwrap().as_deref(),
            Some(conv.id.as_str())
        );
        let reloaded = ConversationStore::load(kv).unwrap();
        assert_eq!(reloaded.current().await.unwrap().context, "scratch");
    }

    #[tokio::test]
    async fn test_add_message_word_sum() {
        let (store, _) = memory_store();
        store.create("").await.unwrap();
        let texts = ["Hello", "two words", "", "  a b  c "];
        for t in texts {
            store.add_message(Message::user(t)).await.unwrap();
        }
        let conv = store.current().await.unwrap();
        assert_eq!(conv.total_words, 1 + 2 + 0 + 3);
        assert_eq!(conv.total_words, conv.recount());
    }

    #[tokio::test]
    async fn test_add_message_duplicate_id() {
        let (store, _) = memory_store();
        store.create("").await.unwrap();
        store.add_message(Message::user("a").with_id("x")).await.unwrap();
        let err = store.add_message(Message::user("b").with_id("x")).await.unwrap_err();
        assert!(matches!(err, MemoryError::DuplicateMessage(_)));
        assert_eq!(store.current().await.unwrap().message_count(), 1);
    }

    #[tokio::test]
    async fn test_update_not_found_and_recount() {
        let (store, _) = memory_store();
        let stranger = ConversationMemory::new("");
        assert!(matches!(
            store.update(stranger).await,
            Err(MemoryError::NotFound(_))
        ));

        let mut conv = store.create("").await.unwrap();
        conv.summary = "three word summary".into();
        conv.total_words = 999;
        store.update(conv.clone()).await.unwrap();
        assert_eq!(store.get(&conv.id).await.unwrap().total_words, 3);
    }

    #[tokio::test]
    async fn test_switch_to_unknown_leaves_pointer() {
        let (store, _) = memory_store();
        let a = store.create("").await.unwrap();
        let missing = ConversationId::from("nope");
        assert!(store.switch_to(&missing).await.unwrap().is_none());
        assert_eq!(store.current_id().await, Some(a.id));
    }

    #[tokio::test]
    async fn test_switch_between_conversations() {
        let (store, _) = memory_store();
        let a = store.create("").await.unwrap();
        let b = store.create("").await.unwrap();
        assert_eq!(store.current_id().await, Some(b.id.clone()));
        let switched = store.switch_to(&a.id).await.unwrap().unwrap();
        assert_eq!(switched.id, a.id);
        assert_eq!(store.current_id().await, Some(a.id));
    }

    #[tokio::test]
    async fn test_delete_current_clears_pointer() {
        let (store, kv) = memory_store();
        let a = store.create("").await.unwrap();
        assert!(store.delete(&a.id).await.unwrap());
        assert!(store.current().await.is_none());
        assert!(store.current_id().await.is_none());
        assert_eq!(kv.get(keys::CURRENT_CONVERSATION).unwrap(), None);
        assert!(!store.delete(&a.id).await.unwrap());

        let b = store.create("").await.unwrap();
        assert_eq!(store.current_id().await, Some(b.id));
    }

    #[tokio::test]
    async fn test_delete_other_keeps_pointer() {
        let (store, _) = memory_store();
        let a = store.create("").await.unwrap();
        let b = store.create("").await.unwrap();
        store.delete(&a.id).await.unwrap();
        assert_eq!(store.current_id().await, Some(b.id));
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_title_unknown_is_noop() {
        let (store, _) = memory_store();
        let a = store.create("").await.unwrap();
        store.update_title(&ConversationId::from("ghost"), "x").await.unwrap();
        store.update_title(&a.id, "Renamed").await.unwrap();
        assert_eq!(store.get(&a.id).await.unwrap().title, "Renamed");
        assert!(!store.update_title_if_default(&a.id, "Generated").await.unwrap());
        assert_eq!(store.get(&a.id).await.unwrap().title, "Renamed");
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let (store, _) = memory_store();
        let a = store.create("").await.unwrap();
        let b = store.create("").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.update_title(&a.id, "touched").await.unwrap();
        let ids: Vec<ConversationId> = store.list().await.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_summarization_window_and_apply() {
        let (store, _) = memory_store();
        let conv = store.create("").await.unwrap();
        for i in 0..50 {
            store
                .add_message(Message::user(format!("word {}", i)))
                .await
                .unwrap();
        }
        let policy = CompactionPolicy::new(50, 10).unwrap();
        assert!(store.needs_summarization(&conv.id, &policy).await);

        let window = store.messages_for_summarization(&conv.id, 10).await.unwrap();
        assert_eq!(window.old_messages.len(), 40);
        assert_eq!(window.recent_messages.len(), 10);

        let compaction = Compaction {
            summary: "counted to forty".into(),
            compacted: window.old_ids(),
        };
        assert!(store.apply_summary(&conv.id, &compaction).await.unwrap());

        let after = store.current().await.unwrap();
        assert_eq!(after.messages, window.recent_messages);
        assert_eq!(after.summary, "counted to forty");
        assert_eq!(after.total_words, 3 + 20);
        assert!(after.last_summarized_at.is_some());
        assert!(!store.needs_summarization(&conv.id, &policy).await);
    }

    #[tokio::test]
    async fn test_apply_summary_keeps_messages_added_meanwhile() {
        let (store, _) = memory_store();
        let conv = store.create("").await.unwrap();
        for i in 0..5 {
            store.add_message(Message::user(format!("m{}", i))).await.unwrap();
        }
        let window = store.messages_for_summarization(&conv.id, 2).await.unwrap();
        store.add_message(Message::user("late")).await.unwrap();

        let compaction = Compaction {
            summary: "s".into(),
            compacted: window.old_ids(),
        };
        store.apply_summary(&conv.id, &compaction).await.unwrap();
        let contents: Vec<String> = store
            .current()
            .await
            .unwrap()
            .messages
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["m3", "m4", "late"]);
    }

    #[tokio::test]
    async fn test_abandoned_completions_are_rejected() {
        let (store, _) = memory_store();
        let a = store.create("").await.unwrap();
        let b = store.create("").await.unwrap();

        assert!(!store.append_if_current(&a.id, Message::assistant("late")).await.unwrap());
        let compaction = Compaction {
            summary: "x".into(),
            compacted: vec![],
        };
        assert!(!store.apply_summary(&a.id, &compaction).await.unwrap());
        assert!(store.get(&a.id).await.unwrap().is_empty());

        assert!(store.append_if_current(&b.id, Message::assistant("hi")).await.unwrap());
        assert_eq!(store.get(&b.id).await.unwrap().message_count(), 1);
    }

    #[tokio::test]
    async fn test_summarization_window_targets_conversation() {
        let (store, _) = memory_store();
        let a = store.create("").await.unwrap();
        for text in ["a0", "a1", "a2", "a3"] {
            store.add_message(Message::user(text)).await.unwrap();
        }
        let b = store.create("").await.unwrap();
        for text in ["b0", "b1", "b2", "b3"] {
            store.add_message(Message::user(text)).await.unwrap();
        }

        let window = store.messages_for_summarization(&a.id, 2).await.unwrap();
        let old: Vec<&str> = window.old_messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(old, vec!["a0", "a1"]);

        assert!(matches!(
            store.messages_for_summarization(&ConversationId::from("ghost"), 2).await,
            Err(MemoryError::NotFound(_))
        ));
        assert_eq!(store.current_id().await, Some(b.id));
    }

    #[tokio::test]
    async fn test_apply_summary_rejects_foreign_messages() {
        let (store, _) = memory_store();
        let a = store.create("").await.unwrap();
        for text in ["a0", "a1", "a2", "a3"] {
            store.add_message(Message::user(text)).await.unwrap();
        }
        let b = store.create("").await.unwrap();
        for text in ["b0", "b1", "b2", "b3"] {
            store.add_message(Message::user(text)).await.unwrap();
        }
        let b_window = store.messages_for_summarization(&b.id, 2).await.unwrap();
        store.switch_to(&a.id).await.unwrap();

        let compaction = Compaction {
            summary: "b talked about b".into(),
            compacted: b_window.old_ids(),
        };
        assert!(!store.apply_summary(&a.id, &compaction).await.unwrap());

        let a_after = store.get(&a.id).await.unwrap();
        assert_eq!(a_after.message_count(), 4);
        assert!(a_after.summary.is_empty());
        assert_eq!(store.get(&b.id).await.unwrap().message_count(), 4);
    }

    #[tokio::test]
    async fn test_current_or_create_creates_once() {
        let (store, _) = memory_store();
        let (first, second) = tokio::join!(store.current_or_create("ctx"), store.current_or_create("ctx"));
        let (first, first_created) = first.unwrap();
        let (second, second_created) = second.unwrap();

        assert_eq!(first.id, second.id);
        assert!(first_created != second_created);
        assert_eq!(store.list().await.len(), 1);
        assert_eq!(store.current().await.unwrap().context, "ctx");

        let (again, created) = store.current_or_create("other").await.unwrap();
        assert_eq!(again.id, first.id);
        assert!(!created);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let kv = Arc::new(FlakyKv {
            inner: MemoryKvStore::new(),
            fail: AtomicBool::new(false),
        });
        let store = ConversationStore::load(kv.clone()).unwrap();
        let a = store.create("").await.unwrap();
        store.add_message(Message::user("kept")).await.unwrap();

        kv.fail.store(true, Ordering::SeqCst);
        assert!(store.add_message(Message::user("lost")).await.is_err());
        assert!(store.create("").await.is_err());
        assert!(store.delete(&a.id).await.is_err());

        let current = store.current().await.unwrap();
        assert_eq!(current.id, a.id);
        assert_eq!(current.message_count(), 1);
        assert_eq!(store.list().await.len(), 1);

        kv.fail.store(false, Ordering::SeqCst);
        let reloaded = ConversationStore::load(kv).unwrap();
        assert_eq!(reloaded.current().await.unwrap().message_count(), 1);
    }

    #[tokio::test]
    async fn test_dangling_pointer_is_repaired_on_load() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set_string(keys::CONVERSATIONS, "{}").unwrap();
        kv.set_string(keys::CURRENT_CONVERSATION, "gone").unwrap();
        let store = ConversationStore::load(kv).unwrap();
        assert!(store.current_id().await.is_none());
    }

    #[tokio::test]
    async fn test_sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let kv = Arc::new(SqliteKvStore::open(dir.path()).unwrap());
            let store = ConversationStore::load(kv).unwrap();
            let conv = store.create("ctx").await.unwrap();
            store.add_message(Message::user("persist me")).await.unwrap();
            store.update_title(&conv.id, "Saved").await.unwrap();
            conv.id
        };
        let kv = Arc::new(SqliteKvStore::open(dir.path()).unwrap());
        let store = ConversationStore::load(kv).unwrap();
        let conv = store.current().await.unwrap();
        assert_eq!(conv.id, id);
        assert_eq!(conv.title, "Saved");
        assert_eq!(conv.total_words, 2);
        assert_eq!(conv.messages[0].content, "persist me");
    }
}
