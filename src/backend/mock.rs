use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::{GenerativeBackend, InvocationOutcome};

/// Backend that replays a fixed script of outcomes and records every model it
/// was asked for. Once the script runs out it keeps answering with `fallback`.
#[derive(Debug)]
pub struct ScriptedBackend {
    name: String,
    script: Mutex<VecDeque<InvocationOutcome>>,
    fallback: InvocationOutcome,
    calls: Mutex<Vec<String>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            name: "scripted-backend".to_owned(),
            script: Mutex::new(VecDeque::new()),
            fallback: InvocationOutcome::Success("Mock response.".to_owned()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedBackend {
    pub fn new(script: impl IntoIterator<Item = InvocationOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn always(outcome: InvocationOutcome) -> Self {
        Self {
            fallback: outcome,
            ..Self::default()
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::always(InvocationOutcome::Success(text.into()))
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, model: &str, prompt: &str) -> InvocationOutcome {
        self.calls.lock().await.push(model.to_owned());
        let outcome = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        debug!(
            backend = %self.name,
            model,
            prompt_chars = prompt.len(),
            outcome = outcome.kind(),
            "scripted outcome served"
        );
        outcome
    }
}
