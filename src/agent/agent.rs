//! Completion-backed agent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::BackendError;
use crate::provider::{CompletionBackend, CompletionRequest};
use crate::types::{GenerationSettings, Message};

use super::{AgentId, ConversationAgent};

/// An agent whose turns are answered by a [`CompletionBackend`].
pub struct Agent {
    id: AgentId,
    name: String,
    system_instruction: String,
    backend: Arc<dyn CompletionBackend>,
    settings: GenerationSettings,
}

impl Agent {
    /// Create a new agent with a fresh id and an empty instruction.
    pub fn new(name: impl Into<String>, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            system_instruction: String::new(),
            backend,
            settings: GenerationSettings::default(),
        }
    }

    /// Set system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Set generation settings.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Wrap into the shared handle rooms work with.
    pub fn into_shared(self) -> super::SharedAgent {
        Arc::new(self)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("backend", &self.backend.provider_name())
            .field("model", &self.backend.model_id())
            .finish()
    }
}

#[async_trait]
impl ConversationAgent for Agent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    fn set_system_instruction(&mut self, instruction: String) {
        self.system_instruction = instruction;
    }

    async fn produce_next(&self, history: &[Message]) -> Result<Message, BackendError> {
        let request = CompletionRequest {
            system: self.system_instruction.clone(),
            messages: history.to_vec(),
            settings: self.settings.clone(),
        };

        let response = self.backend.complete(&request).await?;
        if response.text.trim().is_empty() {
            return Err(BackendError::MalformedResponse(format!(
                "empty completion from {}",
                self.backend.provider_name()
            )));
        }

        debug!(
            agent = %self.name,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            finish_reason = ?response.finish_reason,
            "completion received"
        );
        if response.finish_reason.is_some_and(|r| r.is_truncated()) {
            debug!(agent = %self.name, "reply was cut short by the backend");
        }

        Ok(Message::assistant(self.name.clone(), response.text))
    }
}
