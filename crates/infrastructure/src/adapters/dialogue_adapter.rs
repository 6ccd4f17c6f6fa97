//! Dialogue adapter - Implements DialoguePort using ai_core

use std::sync::Arc;

use ai_core::{InferenceConfig, InferenceEngine, InferenceError, InferenceRequest, OpenAIInferenceEngine};
use application::{
    error::{ApplicationError, FailureKind},
    ports::DialoguePort,
};
use async_trait::async_trait;
use domain::ChatMessage;
use tracing::{debug, instrument, warn};

/// Adapter for OpenAI-compatible chat completion services
pub struct DialogueAdapter {
    engine: Arc<dyn InferenceEngine>,
}

impl std::fmt::Debug for DialogueAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueAdapter")
            .field("model", &self.engine.default_model())
            .finish()
    }
}

impl DialogueAdapter {
    /// Create an adapter backed by the OpenAI chat completions API
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = OpenAIInferenceEngine::new(config)
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_engine(Arc::new(engine)))
    }

    /// Create an adapter around an existing engine
    pub fn with_engine(engine: Arc<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    /// Convert ai_core error to application error
    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::RateLimited => ApplicationError::RateLimited,
            InferenceError::Timeout(ms) => {
                ApplicationError::Timeout(format!("dialogue backend did not answer within {ms}ms"))
            },
            InferenceError::InvalidRequest(msg) => {
                ApplicationError::dialogue(FailureKind::Input, msg)
            },
            InferenceError::Configuration(msg) => ApplicationError::Configuration(msg),
            other => ApplicationError::dialogue(FailureKind::Upstream, other.to_string()),
        }
    }
}

#[async_trait]
impl DialoguePort for DialogueAdapter {
    #[instrument(skip(self, prompt), fields(messages = prompt.len(), model = %self.engine.default_model()))]
    async fn reply(&self, prompt: Vec<ChatMessage>) -> Result<String, ApplicationError> {
        let request = InferenceRequest::from_messages(&prompt);
        let response = self.engine.generate(request).await.map_err(|e| {
            warn!(error = %e, "Chat completion failed");
            Self::map_error(e)
        })?;

        debug!(
            model = %response.model,
            finish_reason = ?response.finish_reason,
            total_tokens = ?response.usage.as_ref().map(|u| u.total_tokens),
            "Chat completion received"
        );

        Ok(response.content)
    }

    async fn is_healthy(&self) -> bool {
        match self.engine.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                debug!(error = %e, "Dialogue backend health check failed");
                false
            },
        }
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}
