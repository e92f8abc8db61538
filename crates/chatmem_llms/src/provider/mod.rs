//! Provider trait, the `TextGenerator` seam, and the registry that joins them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::{LlmError, Result};
use crate::types::ProviderTag;

/// Opaque remote call: prompt in, text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn invoke(&self, prompt: &str, credential: &str, provider: ProviderTag) -> Result<String>;
}

/// One HTTP backend.
#[async_trait]
pub trait Provider: Send + Sync {
    fn tag(&self) -> ProviderTag;

    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String>;
}

/// Registry of providers keyed by tag. Dispatches `invoke` to the tagged provider.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderTag, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own tag. Returns `self` for chaining.
    pub fn register<P: Provider + 'static>(mut self, provider: P) -> Self {
        self.providers.insert(provider.tag(), Arc::new(provider));
        self
    }

    pub fn get_provider(&self, tag: ProviderTag) -> Result<Arc<dyn Provider>> {
        self.providers
            .get(&tag)
            .cloned()
            .ok_or_else(|| LlmError::ProviderNotFound(tag.to_string()))
    }

    pub fn list_providers(&self) -> Vec<ProviderTag> {
        let mut tags: Vec<ProviderTag> = self.providers.keys().copied().collect();
        tags.sort_by_key(|t| t.as_str());
        tags
    }
}

#[async_trait]
impl TextGenerator for ProviderRegistry {
    async fn invoke(&self, prompt: &str, credential: &str, provider: ProviderTag) -> Result<String> {
        if credential.trim().is_empty() {
            return Err(LlmError::CredentialMissing(provider));
        }
        let backend = self.get_provider(provider)?;
        let started = Instant::now();
        let result = backend.generate(prompt, credential.trim()).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(text) => tracing::debug!(
                provider = %provider,
                model = backend.model(),
                elapsed_ms,
                chars = text.len(),
                "generation finished"
            ),
            Err(e) => tracing::warn!(
                provider = %provider,
                model = backend.model(),
                elapsed_ms,
                error = %e,
                "generation failed"
            ),
        }
        result
    }
}
