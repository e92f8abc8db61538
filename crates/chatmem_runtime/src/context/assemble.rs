//! Prompt context assembly.

use chatmem_core::Message;

const SUMMARY_HEADER: &str = "\n\nPrevious conversation summary:\n";
const HISTORY_HEADER: &str = "\n\nRecent conversation history:\n";

/// Builds the context sent with a reply request.
///
/// Order is fixed: scratch context, then the prior summary (if any), then the
/// rendered history (if any).
pub fn assemble(scratch: &str, summary: &str, history: &[Message]) -> String {
    let mut context = scratch.to_string();
    if !summary.is_empty() {
        context.push_str(SUMMARY_HEADER);
        context.push_str(summary);
    }
    if !history.is_empty() {
        context.push_str(HISTORY_HEADER);
        context.push_str(&render_history(history));
    }
    context
}

/// `"User: ..."` / `"Assistant: ..."` lines separated by blank lines.
pub fn render_history(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role_label(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// History for a reply: everything but the in-flight (last) message.
pub fn history_for_reply(messages: &[Message]) -> &[Message] {
    match messages.split_last() {
        Some((_, rest)) => rest,
        None => messages,
    }
}

/// Final prompt for the reply call.
pub fn build_reply_prompt(context: &str, message: &str) -> String {
    if context.trim().is_empty() {
        return message.to_string();
    }
    format!("{}\n\nUser: {}", context, message)
}
