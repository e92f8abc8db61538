//! Condenses old messages into a running summary with one remote call.

use std::sync::Arc;

use chatmem_core::{word_count, Message};
use chatmem_llms::{LlmError, ProviderTag, TextGenerator};
use tracing::{debug, info_span, Instrument};

use crate::context::build_summary_prompt;

#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    pub old_messages: Vec<Message>,
    pub prior_context: String,
    pub prior_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub summary: String,
    pub total_words: u64,
}

pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Summarizes `request.old_messages`, folding in the prior summary.
    ///
    /// Blank credentials fail with `CredentialMissing` without a remote call.
    /// Remote failures pass through unchanged; there are no retries.
    pub async fn summarize(
        &self,
        request: &SummaryRequest,
        credential: &str,
        provider: ProviderTag,
    ) -> Result<Summary, LlmError> {
        if credential.trim().is_empty() {
            return Err(LlmError::CredentialMissing(provider));
        }

        let prompt = build_summary_prompt(
            &request.old_messages,
            &request.prior_context,
            &request.prior_summary,
        );
        let span = info_span!("summarize", provider = %provider, messages = request.old_messages.len());
        let raw = self
            .generator
            .invoke(&prompt, credential, provider)
            .instrument(span)
            .await?;

        let summary = raw.trim().to_string();
        if summary.is_empty() {
            return Err(LlmError::upstream("empty summary"));
        }
        let total_words = word_count(&summary);
        debug!(total_words, "summary produced");
        Ok(Summary {
            summary,
            total_words,
        })
    }
}
