//! Completion-model reasoner.
//!
//! Sends the task to an OpenAI-compatible chat endpoint and returns the
//! model's answer. When switched in after the retriever, the retrieved
//! reference paths are appended to the prompt as context.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use switchback_core::{
    AgentConfig, HandoffState, Message, Provider, ProviderError, ProviderRequest, RunResult,
    Strategy, StrategyError, StrategyKind, Task,
};
use tracing::{debug, warn};

pub const NAME: &str = "OpenAIReasoner";

/// Score for a successful completion.
pub const ANSWER_SCORE: f64 = 0.7;

/// Score when the completion call failed.
pub const ERROR_SCORE: f64 = 0.4;

pub const TEMPERATURE: f32 = 0.2;
pub const MAX_TOKENS: u32 = 600;

const SYSTEM_PROMPT: &str =
    "You are a cautious, high-quality coding assistant. Only provide benign, safe help.";

pub struct OpenAIReasoner {
    provider: Option<Arc<dyn Provider>>,
    model: String,
    references: Option<String>,
    answered: bool,
}

impl OpenAIReasoner {
    pub fn new(provider: Option<Arc<dyn Provider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            references: None,
            answered: false,
        }
    }

    fn build_request(&self, task: &Task) -> ProviderRequest {
        let mut prompt = format!(
            "Task: {}\nRespond concisely with steps and, if applicable, minimal example code in {}.",
            task.description, task.language
        );
        if let Some(references) = &self.references {
            prompt.push_str("\nRelated reference files:\n");
            prompt.push_str(references);
        }

        ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)],
            temperature: TEMPERATURE,
            max_tokens: Some(MAX_TOKENS),
        }
    }
}

#[async_trait]
impl Strategy for OpenAIReasoner {
    fn name(&self) -> &str {
        NAME
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Reasoner
    }

    fn supports(&self, _task: &Task, _config: &AgentConfig) -> bool {
        self.provider.is_some()
    }

    async fn warmup(&mut self, _task: &Task, _config: &AgentConfig) -> Result<(), StrategyError> {
        if self.provider.is_none() {
            return Err(StrategyError::Collaborator {
                strategy: NAME.into(),
                source: ProviderError::NotConfigured("no completion provider".into()),
            });
        }
        Ok(())
    }

    async fn run(&mut self, task: &Task, _config: &AgentConfig) -> RunResult {
        let start = Instant::now();
        let Some(provider) = &self.provider else {
            return RunResult::new("OpenAI not configured", ERROR_SCORE, 0.0, NAME);
        };

        let request = self.build_request(task);
        debug!(provider = provider.name(), model = %self.model, "Requesting completion");

        let (output, score) = match provider.complete(request).await {
            Ok(response) => {
                self.answered = true;
                (response.message.content, ANSWER_SCORE)
            }
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "Completion failed");
                (format!("OpenAI error: {e}"), ERROR_SCORE)
            }
        };

        RunResult::new(output, score, start.elapsed().as_secs_f64(), NAME)
            .with_meta("model", self.model.as_str())
    }

    fn handoff_state(&self) -> HandoffState {
        let mut state = HandoffState::new();
        state.insert("model".into(), self.model.as_str().into());
        state.insert("answered".into(), self.answered.into());
        state
    }

    fn accept_handoff(&mut self, state: &HandoffState) {
        self.references = state
            .get("references")
            .and_then(|v| v.as_str())
            .map(str::to_string);
    }
}
