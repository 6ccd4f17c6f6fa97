//! Dialogue port - Interface for the tutor's language model

use async_trait::async_trait;
use domain::ChatMessage;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for chat-completion operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DialoguePort: Send + Sync {
    /// Generate a reply for an ordered prompt
    ///
    /// The prompt is sent as given. Implementations make one call and do
    /// not retry.
    async fn reply(&self, prompt: Vec<ChatMessage>) -> Result<String, ApplicationError>;

    /// Check if the dialogue backend is healthy
    async fn is_healthy(&self) -> bool;

    /// Get the name of the current model
    fn current_model(&self) -> String;
}
