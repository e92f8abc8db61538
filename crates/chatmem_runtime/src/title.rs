//! Conversation titles from the first user message.

use std::sync::Arc;

use chatmem_constant::defaults::{DEFAULT_TITLE, FALLBACK_TITLE_CHARS, FALLBACK_TITLE_WORDS, MAX_TITLE_CHARS};
use chatmem_llms::{LlmError, ProviderTag, TextGenerator};

use crate::context::build_title_prompt;

pub struct TitleGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl TitleGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Asks the model for a short title.
    ///
    /// A blank credential returns [`fallback_title`] without a remote call.
    /// Remote failures are returned; callers fall back themselves.
    pub async fn generate_title(
        &self,
        first_message: &str,
        credential: &str,
        provider: ProviderTag,
    ) -> Result<String, LlmError> {
        if credential.trim().is_empty() {
            return Ok(fallback_title(first_message));
        }
        let raw = self
            .generator
            .invoke(&build_title_prompt(first_message), credential, provider)
            .await?;
        let title = clean_title(&raw);
        if title.is_empty() {
            return Err(LlmError::upstream("empty title"));
        }
        Ok(title)
    }
}

/// First line of a model reply with quotes and trailing punctuation removed.
pub fn clean_title(raw: &str) -> String {
    let line = raw.trim().lines().next().unwrap_or("").trim();
    let line = line.strip_prefix("Title:").unwrap_or(line);
    let trimmed = line
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*' | '“' | '”'))
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ':' | ';' | ','))
        .trim();
    truncate_chars(trimmed, MAX_TITLE_CHARS, "")
}

/// Deterministic title: the first few words of the message.
pub fn fallback_title(message: &str) -> String {
    let words: Vec<&str> = message.split_whitespace().take(FALLBACK_TITLE_WORDS).collect();
    if words.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    truncate_chars(&words.join(" "), FALLBACK_TITLE_CHARS, "...")
}

fn truncate_chars(s: &str, max: usize, ellipsis: &str) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(ellipsis.chars().count());
    let mut out: String = s.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str(ellipsis);
    out
}
