//! Runtime configuration for chatmem

use std::path::PathBuf;
use std::time::Duration;

use chatmem_constant::defaults;
use chatmem_llms::ProviderTag;

use crate::error::{Result, RuntimeError};

const DEFAULT_PRIMARY_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_SECONDARY_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PRIMARY_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_SECONDARY_BASE_URL: &str = "https://api.openai.com";

/// When to compact a conversation.
///
/// Compaction runs once the conversation holds more than `recency_window`
/// messages and more than `threshold_words` words. The threshold always sits
/// below the display ceiling so compaction fires before the memory badge fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionPolicy {
    pub threshold_words: u64,
    pub recency_window: usize,
    pub ceiling_words: u64,
}

impl CompactionPolicy {
    pub fn new(threshold_words: u64, recency_window: usize) -> Result<Self> {
        Self::with_ceiling(threshold_words, recency_window, defaults::DISPLAY_WORD_CEILING)
    }

    pub fn with_ceiling(threshold_words: u64, recency_window: usize, ceiling_words: u64) -> Result<Self> {
        if threshold_words >= ceiling_words {
            return Err(RuntimeError::Config(format!(
                "compaction threshold {} must be below the display ceiling {}",
                threshold_words, ceiling_words
            )));
        }
        Ok(Self {
            threshold_words,
            recency_window,
            ceiling_words,
        })
    }
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            threshold_words: defaults::COMPACTION_THRESHOLD,
            recency_window: defaults::RECENCY_WINDOW,
            ceiling_words: defaults::DISPLAY_WORD_CEILING,
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Model used by the primary (Gemini) provider
    pub primary_model: String,
    /// Model used by the secondary (OpenAI) provider
    pub secondary_model: String,
    pub primary_base_url: String,
    pub secondary_base_url: String,
    /// Provider used when none has been selected yet
    pub provider: ProviderTag,
    /// Words above which a conversation is compacted
    pub compaction_threshold: u64,
    /// Most recent messages always kept verbatim
    pub recency_window: usize,
    pub request_timeout: Duration,
    /// Directory holding chatmem.db
    pub data_dir: PathBuf,
}

impl RuntimeConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            secondary_model: DEFAULT_SECONDARY_MODEL.to_string(),
            primary_base_url: DEFAULT_PRIMARY_BASE_URL.to_string(),
            secondary_base_url: DEFAULT_SECONDARY_BASE_URL.to_string(),
            provider: ProviderTag::default(),
            compaction_threshold: defaults::COMPACTION_THRESHOLD,
            recency_window: defaults::RECENCY_WINDOW,
            request_timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            data_dir,
        }
    }

    pub fn with_primary_model(mut self, model: impl Into<String>) -> Self {
        self.primary_model = model.into();
        self
    }

    pub fn with_secondary_model(mut self, model: impl Into<String>) -> Self {
        self.secondary_model = model.into();
        self
    }

    pub fn with_primary_base_url(mut self, url: impl Into<String>) -> Self {
        self.primary_base_url = url.into();
        self
    }

    pub fn with_secondary_base_url(mut self, url: impl Into<String>) -> Self {
        self.secondary_base_url = url.into();
        self
    }

    pub fn with_provider(mut self, provider: ProviderTag) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_compaction_threshold(mut self, words: u64) -> Self {
        self.compaction_threshold = words;
        self
    }

    pub fn with_recency_window(mut self, messages: usize) -> Self {
        self.recency_window = messages;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// Validated compaction policy for this config.
    pub fn policy(&self) -> Result<CompactionPolicy> {
        CompactionPolicy::new(self.compaction_threshold, self.recency_window)
    }

    /// Load configuration from environment variables
    pub fn from_env(data_dir: PathBuf) -> Self {
        let mut config = Self::new(data_dir);

        if let Ok(dir) = std::env::var("CHATMEM_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        if let Ok(model) = std::env::var("CHATMEM_PRIMARY_MODEL") {
            config.primary_model = model;
        }

        if let Ok(model) = std::env::var("CHATMEM_SECONDARY_MODEL") {
            config.secondary_model = model;
        }

        if let Ok(url) = std::env::var("CHATMEM_PRIMARY_BASE_URL") {
            config.primary_base_url = url;
        }

        if let Ok(url) = std::env::var("CHATMEM_SECONDARY_BASE_URL") {
            config.secondary_base_url = url;
        }

        if let Ok(provider_str) = std::env::var("CHATMEM_PROVIDER") {
            if let Ok(provider) = provider_str.parse::<ProviderTag>() {
                config.provider = provider;
            }
        }

        if let Ok(threshold) = std::env::var("CHATMEM_COMPACTION_THRESHOLD") {
            if let Ok(val) = threshold.parse::<u64>() {
                config.compaction_threshold = val;
            }
        }

        if let Ok(window) = std::env::var("CHATMEM_RECENCY_WINDOW") {
            if let Ok(val) = window.parse::<usize>() {
                config.recency_window = val;
            }
        }

        if let Ok(secs) = std::env::var("CHATMEM_REQUEST_TIMEOUT_SECS") {
            if let Ok(val) = secs.parse::<u64>() {
                config.request_timeout = Duration::from_secs(val);
            }
        }

        config
    }
}
