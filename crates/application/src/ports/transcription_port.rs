//! Transcription port - Interface for speech-to-text engines

use std::path::Path;

use async_trait::async_trait;
use domain::AudioFormat;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of a transcription operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionResult {
    /// Transcribed text
    pub text: String,
    /// Detected language, if the engine reports one
    pub detected_language: Option<String>,
    /// Duration of audio in milliseconds
    pub duration_ms: Option<u64>,
}

impl TranscriptionResult {
    /// Result carrying only text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detected_language: None,
            duration_ms: None,
        }
    }
}

/// Port for speech-to-text operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    /// Transcribe the audio file at `path`
    ///
    /// Errors are [`ApplicationError::Transcription`], `RateLimited` or `Timeout`.
    async fn transcribe_file(
        &self,
        path: &Path,
        format: AudioFormat,
    ) -> Result<TranscriptionResult, ApplicationError>;

    /// Check if the speech-to-text engine is available
    async fn is_available(&self) -> bool;
}
