//! Domain-level errors

use thiserror::Error;

use crate::entities::TurnState;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// A chat role outside `user`, `assistant` and `system`
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Unknown audio format
    #[error("Unsupported audio format: {0}")]
    UnsupportedAudioFormat(String),

    /// Turn state machine was asked to make an illegal move
    #[error("Invalid turn transition from {from} to {to}")]
    InvalidTransition { from: TurnState, to: TurnState },
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}
