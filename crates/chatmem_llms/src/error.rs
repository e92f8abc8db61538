//! Error types for text generation.

use thiserror::Error;

use crate::types::ProviderTag;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// No API key configured for the provider; no request was made.
    #[error("missing API key for {}", .0.display_name())]
    CredentialMissing(ProviderTag),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("provider not found: {0}")]
    ProviderNotFound(String),
}

impl LlmError {
    pub fn upstream(message: impl Into<String>) -> Self {
        LlmError::Upstream(message.into())
    }

    /// True for failures reported by (or on the way to) the remote service.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            LlmError::Auth(_) | LlmError::RateLimit(_) | LlmError::Upstream(_)
        )
    }

    /// Maps a non-success HTTP status to the error taxonomy.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = format!("{} {}", status.as_u16(), truncate(body, 300));
        match status.as_u16() {
            401 | 403 => LlmError::Auth(message),
            429 => LlmError::RateLimit(message),
            _ => LlmError::Upstream(message),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Upstream(e.to_string())
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(e: serde_json::Error) -> Self {
        LlmError::Upstream(format!("invalid response body: {}", e))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
