//! Scripted `TextGenerator` for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatmem_llms::{LlmError, ProviderTag, TextGenerator};
use tokio::sync::Notify;

type Reply = Result<String, LlmError>;

/// Answers prompts from a script.
///
/// Resolution order: the first rule whose needle occurs in the prompt, then the
/// queue, then the fallback. Rules are not consumed.
#[derive(Default)]
pub(crate) struct ScriptedGenerator {
    rules: Mutex<Vec<(String, Reply)>>,
    queue: Mutex<VecDeque<Reply>>,
    fallback: Mutex<Option<Reply>>,
    gates: Mutex<Vec<(String, Arc<Notify>)>>,
    prompts: Mutex<Vec<(String, String, ProviderTag)>>,
}

impl ScriptedGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: Arc<Self>, text: &str) -> Arc<Self> {
        self.queue.lock().unwrap().push_back(Ok(text.to_string()));
        self
    }

    pub fn fail(self: Arc<Self>, error: LlmError) -> Arc<Self> {
        self.queue.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn when(self: Arc<Self>, needle: &str, reply: Reply) -> Arc<Self> {
        self.rules.lock().unwrap().push((needle.to_string(), reply));
        self
    }

    pub fn otherwise(self: Arc<Self>, reply: Reply) -> Arc<Self> {
        *self.fallback.lock().unwrap() = Some(reply);
        self
    }

    /// Prompts containing `needle` wait for `notify_waiters` on the returned handle.
    pub fn gate(self: &Arc<Self>, needle: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().push((needle.to_string(), notify.clone()));
        notify
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().iter().map(|(p, _, _)| p.clone()).collect()
    }

    pub fn credentials(&self) -> Vec<(String, ProviderTag)> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c, t)| (c.clone(), *t))
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.prompts().iter().filter(|p| p.contains(needle)).count()
    }

    fn resolve(&self, prompt: &str) -> Reply {
        if let Some((_, reply)) = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
        {
            return reply.clone();
        }
        if let Some(reply) = self.queue.lock().unwrap().pop_front() {
            return reply;
        }
        self.fallback
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(LlmError::upstream("no scripted reply")))
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn invoke(&self, prompt: &str, credential: &str, provider: ProviderTag) -> Result<String, LlmError> {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, n)| n.clone());
        // registered before the call is recorded so `notify_waiters` cannot be missed
        let notified = gate.as_ref().map(|g| g.notified());
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), credential.to_string(), provider));
        if let Some(notified) = notified {
            notified.await;
        }
        self.resolve(prompt)
    }
}
