//! chatmem_llms: text generation seam and HTTP providers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │        ProviderRegistry  (impl TextGenerator)        │
//! │  ┌──────────────────────────────────────────────┐   │
//! │  │  HashMap<ProviderTag, Arc<dyn Provider>>      │   │
//! │  └──────────────────────────────────────────────┘   │
//! │                       │                              │
//! │               ┌───────┴───────┐                      │
//! │               ▼               ▼                      │
//! │        ┌───────────┐   ┌───────────┐                │
//! │        │  Gemini   │   │  OpenAI   │                │
//! │        │ (primary) │   │(secondary)│                │
//! │        └───────────┘   └───────────┘                │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chatmem_llms::{GeminiProvider, OpenAiProvider, ProviderRegistry, ProviderTag, TextGenerator};
//!
//! # async fn run() -> chatmem_llms::Result<()> {
//! let registry = ProviderRegistry::new()
//!     .register(GeminiProvider::default())
//!     .register(OpenAiProvider::default());
//! let reply = registry.invoke("Hello", "my-key", ProviderTag::Primary).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod provider;
pub mod providers;
pub mod types;


pub use error::{LlmError, Result};
pub use provider::{Provider, ProviderRegistry, TextGenerator};
pub use providers::{GeminiProvider, OpenAiProvider};
pub use types::{ProviderConfig, ProviderTag};
