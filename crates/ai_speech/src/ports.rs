//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech processing adapters must implement.

use std::path::Path;

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{AudioData, AudioFormat, Transcription};

/// Port for Speech-to-Text (STT) implementations
///
/// Implementations of this trait convert audio data to text transcriptions.
///
/// # Example
///
/// ```ignore
/// use ai_speech::{SpeechToText, AudioData, AudioFormat};
///
/// async fn transcribe_upload(
///     stt: &impl SpeechToText,
///     audio: AudioData,
/// ) -> Result<String, SpeechError> {
///     let transcription = stt.transcribe(audio).await?;
///     Ok(transcription.text)
/// }
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe audio to text
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if transcription fails.
    async fn transcribe(&self, audio: AudioData) -> Result<Transcription, SpeechError>;

    /// Transcribe an audio file already on local storage
    ///
    /// The default implementation reads the file and delegates to
    /// [`transcribe`](Self::transcribe). Engines that read files themselves
    /// should override it.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the file cannot be read or transcription fails.
    async fn transcribe_file(
        &self,
        path: &Path,
        format: AudioFormat,
    ) -> Result<Transcription, SpeechError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to read audio file: {e}"))
        })?;
        self.transcribe(AudioData::new(data, format)).await
    }

    /// Check if the STT service is available
    async fn is_available(&self) -> bool;

    /// Get the name of the current STT model
    fn model_name(&self) -> &str;
}

/// Port for Text-to-Speech (TTS) implementations
///
/// Implementations of this trait convert text to audio speech.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `voice` - Optional voice ID to use (uses default if None)
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioData, SpeechError>;

    /// Check if the TTS service is available
    async fn is_available(&self) -> bool;

    /// Get the name of the current TTS model
    fn model_name(&self) -> &str;

    /// Get the default voice ID
    fn default_voice(&self) -> &str;
}
