//! The send sequence: append, optional compaction, reply.

use std::sync::Arc;
use std::time::Instant;

use chatmem_core::{
    ChatEvent, ConversationId, Message, NoticeKind, OperationState, SystemNotice,
};
use chatmem_llms::ProviderTag;
use chatmem_observability::{conversation_span, llm_span, record_duration, record_error};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use crate::context::{assemble, build_reply_prompt, history_for_reply};
use crate::error::{Result, RuntimeError};
use crate::preferences::Preferences;
use crate::store::{Compaction, ConversationStore};
use crate::summarizer::SummaryRequest;
use crate::title::{fallback_title, TitleGenerator};

use super::status::{SendGuard, TitleGuard};
use super::{emit, ConversationController};

/// Result of one `send_message` call.
#[derive(Debug)]
pub struct SendOutcome {
    pub conversation_id: ConversationId,
    pub user_message: Message,
    /// Assistant reply, if one was produced and stored
    pub reply: Option<Message>,
    /// Whether older messages were compacted during this send
    pub summarized: bool,
    pub notices: Vec<SystemNotice>,
    /// Title generation started by the first message of a conversation
    pub title_task: Option<JoinHandle<TitleOutcome>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleOutcome {
    pub title: String,
    /// False when the conversation was renamed or deleted meanwhile
    pub applied: bool,
    pub notice: Option<SystemNotice>,
}

impl ConversationController {
    /// Sends a user message on the current conversation.
    ///
    /// The user message is stored before anything else and is never dropped.
    /// Model, summarization and title failures become notices; storage
    /// failures are returned as errors.
    pub async fn send_message(&self, text: &str) -> Result<SendOutcome> {
        if text.trim().is_empty() {
            return Err(RuntimeError::EmptyMessage);
        }

        let conversation = self.ensure_current().await?;
        let id = conversation.id.clone();
        if !self.status.try_begin_send(&id) {
            return Err(RuntimeError::Busy(id));
        }
        let _guard = SendGuard::new(self.status.clone(), id.clone());

        let span = conversation_span!(id, "send_message");
        let result = self
            .run_send(id.clone(), text, conversation.is_empty() && conversation.has_default_title())
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            let _entered = span.enter();
            record_error(e);
        }
        self.emit(ChatEvent::state_changed(id, OperationState::Idle));
        result
    }

    async fn run_send(&self, id: ConversationId, text: &str, first_message: bool) -> Result<SendOutcome> {
        let started = Instant::now();
        self.emit(ChatEvent::state_changed(id.clone(), OperationState::Sending));

        let user_message = Message::user(text);
        self.store.append_to(&id, user_message.clone()).await?;
        self.emit(ChatEvent::message_added(id.clone(), user_message.clone()));

        let title_task = if first_message && self.status.try_begin_title(&id) {
            Some(self.spawn_title(id.clone(), text.to_string()))
        } else {
            None
        };

        let mut outcome = SendOutcome {
            conversation_id: id.clone(),
            user_message,
            reply: None,
            summarized: false,
            notices: Vec::new(),
            title_task,
        };

        if self.store.current_id().await.as_ref() == Some(&id)
            && self.store.needs_summarization(&id, &self.policy).await
        {
            outcome.summarized = self.compact(&id, &mut outcome.notices).await?;
        }

        outcome.reply = self.reply(&id, text, &mut outcome.notices).await?;

        for notice in &outcome.notices {
            self.emit(ChatEvent::notice(id.clone(), notice.clone()));
        }
        record_duration("duration_ms", started.elapsed());
        debug!(
            replied = outcome.reply.is_some(),
            summarized = outcome.summarized,
            notices = outcome.notices.len(),
            "send finished"
        );
        Ok(outcome)
    }

    /// Replaces the old messages of `id` with a summary. Returns whether a
    /// compaction was applied.
    async fn compact(&self, id: &ConversationId, notices: &mut Vec<SystemNotice>) -> Result<bool> {
        self.set_state(id, OperationState::Summarizing);

        let window = self
            .store
            .messages_for_summarization(id, self.policy.recency_window)
            .await?;
        if !window.is_compactable() {
            return Ok(false);
        }

        let provider = self.preferences.provider();
        let credential = self.preferences.credential(provider);
        if credential.is_empty() {
            notices.push(SystemNotice::missing_credential(format!(
                "Cannot summarize: Please add your {} API key.",
                provider.display_name()
            )));
            return Ok(false);
        }

        let Some(conversation) = self.store.get(id).await else {
            return Ok(false);
        };
        let request = SummaryRequest {
            old_messages: window.old_messages.clone(),
            prior_context: conversation.context,
            prior_summary: conversation.summary,
        };

        let span = llm_span!(provider, "summarize");
        let summary = match self
            .summarizer
            .summarize(&request, &credential, provider)
            .instrument(span.clone())
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                let _entered = span.enter();
                record_error(&e);
                notices.push(SystemNotice::summarization_failed(&e));
                return Ok(false);
            }
        };

        let compaction = Compaction {
            summary: summary.summary,
            compacted: window.old_ids(),
        };
        let applied = self.store.apply_summary(id, &compaction).await?;
        if applied {
            let total_words = self.store.get(id).await.map(|c| c.total_words).unwrap_or(0);
            info!(
                conversation_id = %id,
                compacted = compaction.compacted.len(),
                summary_words = summary.total_words,
                total_words,
                "conversation compacted"
            );
            self.emit(ChatEvent::Summarized {
                conversation_id: id.clone(),
                compacted: compaction.compacted.len(),
                total_words,
            });
        } else {
            debug!(conversation_id = %id, "summary no longer applies, dropped");
        }
        Ok(applied)
    }

    async fn reply(
        &self,
        id: &ConversationId,
        text: &str,
        notices: &mut Vec<SystemNotice>,
    ) -> Result<Option<Message>> {
        self.set_state(id, OperationState::AwaitingModel);

        let provider = self.preferences.provider();
        let credential = self.preferences.credential(provider);
        if credential.is_empty() {
            notices.push(SystemNotice::missing_credential(missing_key_text(provider)));
            return Ok(None);
        }

        let Some(conversation) = self.store.get(id).await else {
            debug!(conversation_id = %id, "conversation deleted before reply");
            return Ok(None);
        };
        let scratch = self.preferences.scratch_context();
        let base = if scratch.is_empty() {
            conversation.context.as_str()
        } else {
            scratch.as_str()
        };
        let context = assemble(base, &conversation.summary, history_for_reply(&conversation.messages));
        let prompt = build_reply_prompt(&context, text);

        let span = llm_span!(provider, "reply");
        let started = Instant::now();
        let result = self
            .generator
            .invoke(&prompt, &credential, provider)
            .instrument(span.clone())
            .await;
        {
            let _entered = span.enter();
            record_duration("duration_ms", started.elapsed());
        }

        let reply_text = match result {
            Ok(reply) if reply.trim().is_empty() => {
                notices.push(SystemNotice::reply_failed("empty reply"));
                return Ok(None);
            }
            Ok(reply) => reply,
            Err(e) => {
                let _entered = span.enter();
                record_error(&e);
                notices.push(SystemNotice::reply_failed(&e));
                return Ok(None);
            }
        };

        let message = Message::assistant(reply_text);
        if self.store.append_if_current(id, message.clone()).await? {
            self.emit(ChatEvent::message_added(id.clone(), message.clone()));
            Ok(Some(message))
        } else {
            info!(conversation_id = %id, "conversation no longer current, reply dropped");
            Ok(None)
        }
    }

    fn set_state(&self, id: &ConversationId, state: OperationState) {
        self.status.set_state(id, state);
        self.emit(ChatEvent::state_changed(id.clone(), state));
    }

    fn spawn_title(&self, id: ConversationId, first_message: String) -> JoinHandle<TitleOutcome> {
        let task = TitleTask {
            titles: self.titles.clone(),
            store: self.store.clone(),
            preferences: self.preferences.clone(),
            event_tx: self.event_tx.clone(),
            guard: TitleGuard::new(self.status.clone(), id.clone()),
            id,
        };
        tokio::spawn(task.run(first_message).in_current_span())
    }
}

fn missing_key_text(provider: ProviderTag) -> String {
    format!("Please add your {} API key in the settings.", provider.display_name())
}

/// Title generation detached from the send sequence.
struct TitleTask {
    titles: Arc<TitleGenerator>,
    store: Arc<ConversationStore>,
    preferences: Arc<Preferences>,
    event_tx: Option<mpsc::Sender<ChatEvent>>,
    guard: TitleGuard,
    id: ConversationId,
}

impl TitleTask {
    async fn run(self, first_message: String) -> TitleOutcome {
        let provider = self.preferences.provider();
        let credential = self.preferences.credential(provider);

        let (title, notice) = match self
            .titles
            .generate_title(&first_message, &credential, provider)
            .await
        {
            Ok(title) if credential.is_empty() => (
                title,
                Some(SystemNotice::new(
                    NoticeKind::TitleFallback,
                    "Cannot generate title: API key not set. Using fallback.",
                )),
            ),
            Ok(title) => (title, None),
            Err(e) => {
                warn!(conversation_id = %self.id, error = %e, "title generation failed");
                (
                    fallback_title(&first_message),
                    Some(SystemNotice::new(
                        NoticeKind::TitleFallback,
                        format!("Title generation failed: {}. Using fallback.", e),
                    )),
                )
            }
        };

        let applied = match self.store.update_title_if_default(&self.id, &title).await {
            Ok(applied) => applied,
            Err(e) => {
                warn!(conversation_id = %self.id, error = %e, "could not store title");
                false
            }
        };
        if applied {
            emit(&self.event_tx, ChatEvent::title_updated(self.id.clone(), title.clone()));
        }
        if let Some(notice) = &notice {
            emit(&self.event_tx, ChatEvent::notice(self.id.clone(), notice.clone()));
        }
        drop(self.guard);

        TitleOutcome {
            title,
            applied,
            notice,
        }
    }
}
