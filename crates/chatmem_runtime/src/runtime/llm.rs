//! Provider registry built from runtime configuration.

use chatmem_llms::{GeminiProvider, OpenAiProvider, ProviderConfig, ProviderRegistry};

use crate::config::RuntimeConfig;

pub fn build_registry(config: &RuntimeConfig) -> ProviderRegistry {
    let primary = ProviderConfig::new(&config.primary_base_url, &config.primary_model)
        .with_timeout(config.request_timeout);
    let secondary = ProviderConfig::new(&config.secondary_base_url, &config.secondary_model)
        .with_timeout(config.request_timeout);
    ProviderRegistry::new()
        .register(GeminiProvider::new(primary))
        .register(OpenAiProvider::new(secondary))
}
