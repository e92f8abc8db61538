//! Context building for the conversation controller.
//!
//! Split into focused submodules:
//! - **window**: recency split and the compaction trigger
//! - **assemble**: scratch context + summary + history into one prompt context
//! - **prompt**: prompt templates for replies, summaries and titles

mod assemble;
mod prompt;
mod window;

pub use assemble::{assemble, build_reply_prompt, history_for_reply, render_history};
pub use prompt::{build_summary_prompt, build_title_prompt};
pub use window::{needs_compaction, split_window, SummarizationWindow};
