use serde::{Deserialize, Serialize};

use crate::conversation::ConversationId;
use crate::message::Message;

/// Phase of the send sequence for one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    #[default]
    Idle,
    Sending,
    Summarizing,
    AwaitingModel,
}

impl OperationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationState::Idle => "idle",
            OperationState::Sending => "sending",
            OperationState::Summarizing => "summarizing",
            OperationState::AwaitingModel => "awaiting_model",
        }
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self, OperationState::Idle)
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    MissingCredential,
    SummarizationFailed,
    ReplyFailed,
    TitleFallback,
}

/// Transient user-visible message. Never stored in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemNotice {
    pub kind: NoticeKind,
    pub text: String,
}

impl SystemNotice {
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn missing_credential(text: impl Into<String>) -> Self {
        Self::new(NoticeKind::MissingCredential, text)
    }

    pub fn summarization_failed(reason: impl std::fmt::Display) -> Self {
        Self::new(
            NoticeKind::SummarizationFailed,
            format!("Summarization failed: {}", reason),
        )
    }

    pub fn reply_failed(reason: impl std::fmt::Display) -> Self {
        Self::new(NoticeKind::ReplyFailed, format!("Error: {}", reason))
    }
}

impl std::fmt::Display for SystemNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    ConversationCreated {
        conversation_id: ConversationId,
    },

    ConversationSwitched {
        conversation_id: ConversationId,
    },

    ConversationDeleted {
        conversation_id: ConversationId,
    },

    MessageAdded {
        conversation_id: ConversationId,
        message: Message,
    },

    StateChanged {
        conversation_id: ConversationId,
        state: OperationState,
    },

    Summarized {
        conversation_id: ConversationId,
        compacted: usize,
        total_words: u64,
    },

    TitleUpdated {
        conversation_id: ConversationId,
        title: String,
    },

    Notice {
        conversation_id: ConversationId,
        notice: SystemNotice,
    },
}

impl ChatEvent {
    pub fn message_added(conversation_id: ConversationId, message: Message) -> Self {
        ChatEvent::MessageAdded {
            conversation_id,
            message,
        }
    }

    pub fn state_changed(conversation_id: ConversationId, state: OperationState) -> Self {
        ChatEvent::StateChanged {
            conversation_id,
            state,
        }
    }

    pub fn title_updated(conversation_id: ConversationId, title: impl Into<String>) -> Self {
        ChatEvent::TitleUpdated {
            conversation_id,
            title: title.into(),
        }
    }

    pub fn notice(conversation_id: ConversationId, notice: SystemNotice) -> Self {
        ChatEvent::Notice {
            conversation_id,
            notice,
        }
    }

    pub fn conversation_id(&self) -> &ConversationId {
        match self {
            ChatEvent::ConversationCreated { conversation_id }
            | ChatEvent::ConversationSwitched { conversation_id }
            | ChatEvent::ConversationDeleted { conversation_id }
            | ChatEvent::MessageAdded { conversation_id, .. }
            | ChatEvent::StateChanged { conversation_id, .. }
            | ChatEvent::Summarized { conversation_id, .. }
            | ChatEvent::TitleUpdated { conversation_id, .. }
            | ChatEvent::Notice { conversation_id, .. } => conversation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_state_default_is_idle() {
        assert_eq!(OperationState::default(), OperationState::Idle);
        assert!(!OperationState::Idle.is_busy());
        assert!(OperationState::Summarizing.is_busy());
        assert_eq!(OperationState::AwaitingModel.to_string(), "awaiting_model");
    }

    #[test]
    fn test_notice_text() {
        let notice = SystemNotice::summarization_failed("rate limited");
        assert_eq!(notice.kind, NoticeKind::SummarizationFailed);
        assert_eq!(notice.text, "Summarization failed: rate limited");

        let notice = SystemNotice::reply_failed("timeout");
        assert_eq!(notice.to_string(), "Error: timeout");
    }

    #[test]
    fn test_message_added_event() {
        let id = ConversationId::from("c1");
        let event = ChatEvent::message_added(id.clone(), Message::user("hi"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"message_added"#));
        assert!(json.contains(r#""conversation_id":"c1"#));
        assert_eq!(event.conversation_id(), &id);
    }

    #[test]
    fn test_notice_event() {
        let event = ChatEvent::notice(
            ConversationId::from("c1"),
            SystemNotice::missing_credential("Please add your Gemini API key."),
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"notice"#));
        assert!(json.contains(r#""kind":"missing_credential"#));
    }

    #[test]
    fn test_state_changed_event() {
        let event = ChatEvent::state_changed(ConversationId::from("c1"), OperationState::Summarizing);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""state":"summarizing"#));
    }
}
