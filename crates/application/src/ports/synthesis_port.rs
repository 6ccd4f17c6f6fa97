//! Synthesis port - Interface for text-to-speech engines

use async_trait::async_trait;
use domain::AudioFormat;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Audio produced by a synthesis engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    /// Encoded audio bytes
    pub data: Vec<u8>,
    /// Container format of `data`
    pub format: AudioFormat,
}

/// Port for text-to-speech operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SynthesisPort: Send + Sync {
    /// Synthesize speech from text
    async fn synthesize(&self, text: String) -> Result<SynthesizedAudio, ApplicationError>;

    /// Check if the text-to-speech engine is available
    async fn is_available(&self) -> bool;
}
