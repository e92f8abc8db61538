use async_trait::async_trait;
use reqwest::Client;

use super::types::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiRequest, GeminiResponse};
use crate::error::{LlmError, Result};
use crate::provider::Provider;
use crate::providers::send_with_timeout;
use crate::types::{ProviderConfig, ProviderTag};

/// Gemini provider. Registered as [`ProviderTag::Primary`].
pub struct GeminiProvider {
    config: ProviderConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new(ProviderConfig::new(DEFAULT_BASE_URL, DEFAULT_MODEL))
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Primary
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String> {
        let url = self
            .config
            .endpoint(&format!("v1beta/models/{}:generateContent", self.config.model));
        let body = GeminiRequest::from_prompt(prompt);

        let text = send_with_timeout(
            self.config.timeout,
            self.client
                .post(&url)
                .header("x-goog-api-key", api_key)
                .json(&body)
                .send(),
        )
        .await?;

        let parsed: GeminiResponse = serde_json::from_str(&text)?;
        parsed
            .text()
            .ok_or_else(|| LlmError::upstream("gemini response had no candidates"))
    }
}
