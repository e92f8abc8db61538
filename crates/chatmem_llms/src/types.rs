//! Shared provider types.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which configured provider a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderTag {
    /// Gemini
    #[default]
    Primary,
    /// OpenAI
    Secondary,
}

impl ProviderTag {
    pub const ALL: [ProviderTag; 2] = [ProviderTag::Primary, ProviderTag::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderTag::Primary => "primary",
            ProviderTag::Secondary => "secondary",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderTag::Primary => "Gemini",
            ProviderTag::Secondary => "OpenAI",
        }
    }

    /// Environment variable consulted when no key is stored.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderTag::Primary => "GEMINI_API_KEY",
            ProviderTag::Secondary => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "gemini" => Ok(ProviderTag::Primary),
            "secondary" | "openai" => Ok(ProviderTag::Secondary),
            other => Err(format!(
                "unknown provider: {} (expected primary|gemini or secondary|openai)",
                other
            )),
        }
    }
}

/// Endpoint settings for one HTTP provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
