//! Application-level errors

use std::fmt;

use thiserror::Error;

/// Whose fault a step failure is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The caller sent something unusable
    Input,
    /// The external engine or service failed
    Upstream,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Upstream => f.write_str("upstream"),
        }
    }
}

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Speech could not be turned into text
    #[error("Transcription failed: {message}")]
    Transcription { kind: FailureKind, message: String },

    /// No tutor reply could be produced
    #[error("Dialogue failed: {message}")]
    Dialogue { kind: FailureKind, message: String },

    /// The reply could not be turned into speech
    #[error("Synthesis failed: {message}")]
    Synthesis { kind: FailureKind, message: String },

    /// Unknown, expired or already reclaimed artifact
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// An outbound call ran out of time
    #[error("Upstream timeout: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Transcription failure
    pub fn transcription(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Transcription {
            kind,
            message: message.into(),
        }
    }

    /// Dialogue failure
    pub fn dialogue(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Dialogue {
            kind,
            message: message.into(),
        }
    }

    /// Synthesis failure
    pub fn synthesis(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Synthesis {
            kind,
            message: message.into(),
        }
    }

    /// Failure kind of a step error, if this is one
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Transcription { kind, .. }
            | Self::Dialogue { kind, .. }
            | Self::Synthesis { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the caller's request caused this error
    pub fn is_input_error(&self) -> bool {
        matches!(self.failure_kind(), Some(FailureKind::Input))
            || matches!(self, Self::ArtifactNotFound(_))
    }
}
