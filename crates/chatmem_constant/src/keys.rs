//! Keys of the durable key-value store.

/// Serialized conversation index (id -> conversation).
pub const CONVERSATIONS: &str = "conversations";
/// Id of the current conversation.
pub const CURRENT_CONVERSATION: &str = "current_conversation_id";
/// Free-form scratch context merged into every prompt.
pub const CHAT_CONTEXT: &str = "chat_context";
/// Provider tag selected by the user.
pub const SELECTED_PROVIDER: &str = "selected_provider";
/// Prefix of per-provider credentials (`api_key:primary`, `api_key:secondary`).
pub const API_KEY_PREFIX: &str = "api_key:";
