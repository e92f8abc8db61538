//! OpenAI Chat Completions provider.

mod provider;
mod types;

pub use provider::OpenAiProvider;
