//! Prompt templates for summaries and titles.

use chatmem_core::Message;

use super::assemble::render_history;

const SUMMARY_INSTRUCTIONS: &str = "Concisely summarize the following conversation so it can replace the original messages. \
Keep names, decisions, facts and open questions. The summary should be a single, evolving text that \
represents the entire conversation so far.";

const TITLE_INSTRUCTIONS: &str = "Generate a short title (at most 6 words) for a conversation that starts with the \
message below. Reply with the title only, no quotes or punctuation.";

/// Prompt asking for a summary that folds `old_messages` into `prior_summary`.
pub fn build_summary_prompt(old_messages: &[Message], prior_context: &str, prior_summary: &str) -> String {
    format!(
        "{}\n\n---\n\nCONTEXT:\n{}\n\nPREVIOUS SUMMARY:\n{}\n\nNEW LINES:\n{}\n\n---\n\nNEW SUMMARY:",
        SUMMARY_INSTRUCTIONS,
        or_none(prior_context),
        or_none(prior_summary),
        render_history(old_messages)
    )
}

pub fn build_title_prompt(first_message: &str) -> String {
    format!("{}\n\nMessage:\n{}", TITLE_INSTRUCTIONS, first_message.trim())
}

fn or_none(s: &str) -> &str {
    if s.trim().is_empty() { "(none)" } else { s }
}
