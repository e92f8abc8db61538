//! User preferences: scratch context, selected provider and API keys.
//!
//! Scratch context changes are broadcast over a `watch` channel so the
//! controller can reconcile the current conversation's stored context.

use std::sync::Arc;

use chatmem_constant::keys;
use chatmem_core::{KvStore, MemoryError};
use chatmem_llms::ProviderTag;
use tokio::sync::watch;
use tracing::{debug, warn};

type MemoryResult<T> = std::result::Result<T, MemoryError>;

pub struct Preferences {
    kv: Arc<dyn KvStore>,
    default_provider: ProviderTag,
    env_fallback: bool,
    context_tx: watch::Sender<String>,
}

impl Preferences {
    pub fn load(kv: Arc<dyn KvStore>, default_provider: ProviderTag) -> MemoryResult<Self> {
        let context = kv.get_string(keys::CHAT_CONTEXT)?.unwrap_or_default();
        let (context_tx, _) = watch::channel(context);
        Ok(Self {
            kv,
            default_provider,
            env_fallback: true,
            context_tx,
        })
    }

    /// Only stored keys count; provider environment variables are ignored.
    pub fn without_env_fallback(mut self) -> Self {
        self.env_fallback = false;
        self
    }

    /// Latest saved scratch context.
    pub fn scratch_context(&self) -> String {
        self.context_tx.borrow().clone()
    }

    /// Saves the scratch context and notifies subscribers.
    pub fn set_scratch_context(&self, text: &str) -> MemoryResult<()> {
        self.kv.set_string(keys::CHAT_CONTEXT, text)?;
        self.context_tx.send_replace(text.to_string());
        debug!(chars = text.len(), "scratch context updated");
        Ok(())
    }

    pub fn subscribe_context(&self) -> watch::Receiver<String> {
        self.context_tx.subscribe()
    }

    /// Selected provider; falls back to the configured default.
    pub fn provider(&self) -> ProviderTag {
        match self.kv.get_string(keys::SELECTED_PROVIDER) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "ignoring unknown saved provider");
                self.default_provider
            }),
            Ok(None) => self.default_provider,
            Err(e) => {
                warn!(error = %e, "could not read saved provider");
                self.default_provider
            }
        }
    }

    pub fn select_provider(&self, provider: ProviderTag) -> MemoryResult<()> {
        self.kv.set_string(keys::SELECTED_PROVIDER, provider.as_str())
    }

    /// Stored key for `provider`, else its environment variable, else empty.
    pub fn credential(&self, provider: ProviderTag) -> String {
        let stored = self
            .kv
            .get_string(&credential_key(provider))
            .unwrap_or_else(|e| {
                warn!(provider = %provider, error = %e, "could not read stored API key");
                None
            })
            .filter(|k| !k.trim().is_empty());
        stored
            .or_else(|| {
                self.env_fallback
                    .then(|| std::env::var(provider.api_key_env()).ok())
                    .flatten()
            })
            .map(|k| k.trim().to_string())
            .unwrap_or_default()
    }

    /// Stores an API key. A blank key removes the stored one.
    pub fn set_credential(&self, provider: ProviderTag, key: &str) -> MemoryResult<()> {
        let name = credential_key(provider);
        if key.trim().is_empty() {
            self.kv.remove(&name)
        } else {
            self.kv.set_string(&name, key.trim())
        }
    }
}

fn credential_key(provider: ProviderTag) -> String {
    format!("{}{}", keys::API_KEY_PREFIX, provider.as_str())
}
