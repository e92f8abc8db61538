use async_trait::async_trait;
use reqwest::Client;

use super::types::{ChatRequest, ChatRequestMessage, ChatResponse, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::{LlmError, Result};
use crate::provider::Provider;
use crate::providers::send_with_timeout;
use crate::types::{ProviderConfig, ProviderTag};

/// OpenAI provider. Registered as [`ProviderTag::Secondary`].
pub struct OpenAiProvider {
    config: ProviderConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new(ProviderConfig::new(DEFAULT_BASE_URL, DEFAULT_MODEL))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn tag(&self) -> ProviderTag {
        ProviderTag::Secondary
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String> {
        let url = self.config.endpoint("v1/chat/completions");
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let text = send_with_timeout(
            self.config.timeout,
            self.client.post(&url).bearer_auth(api_key).json(&body).send(),
        )
        .await?;

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::upstream("openai response had no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn provider_for(server: &mockito::Server) -> OpenAiProvider {
        OpenAiProvider::new(
            ProviderConfig::new(server.url(), "gpt-test").with_timeout(Duration::from_secs(5)),
        )
    }

    #[tokio::test]
    async fn generate_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "model": "gpt-test",
                "messages": [{ "role": "user", "content": "Hello" }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Hi!"}}]}"#)
            .create_async()
            .await;

        let out = provider_for(&server).generate("Hello", "sk-test").await.unwrap();
        assert_eq!(out, "Hi!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn too_many_requests_maps_to_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let err = provider_for(&server).generate("Hello", "sk").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimit(_)));
    }

    #[tokio::test]
    async fn server_error_maps_to_upstream() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(502)
            .create_async()
            .await;

        let err = provider_for(&server).generate("Hello", "sk").await.unwrap_err();
        assert!(matches!(err, LlmError::Upstream(m) if m.starts_with("502")));
    }

    #[tokio::test]
    async fn malformed_body_is_upstream() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = provider_for(&server).generate("Hello", "sk").await.unwrap_err();
        assert!(matches!(err, LlmError::Upstream(m) if m.contains("invalid response body")));
    }
}
