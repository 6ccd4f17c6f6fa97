//! Speech adapters - Implement TranscriptionPort and SynthesisPort using ai_speech

use std::{path::Path, sync::Arc};

use ai_speech::{
    OpenAISpeechProvider, SpeechConfig, SpeechError, SpeechProvider, SpeechToText, TextToSpeech,
    WhisperCppProvider,
};
use application::{
    error::{ApplicationError, FailureKind},
    ports::{SynthesisPort, SynthesizedAudio, TranscriptionPort, TranscriptionResult},
};
use async_trait::async_trait;
use domain::AudioFormat;
use tracing::{debug, info, instrument};

/// Map a speech error onto the failing step
///
/// `step` builds the step error (transcription or synthesis) for failures
/// that are not rate limits, timeouts or configuration problems.
fn map_error(err: SpeechError, step: fn(FailureKind, String) -> ApplicationError) -> ApplicationError {
    match err {
        SpeechError::RateLimited => ApplicationError::RateLimited,
        SpeechError::Timeout(ms) => {
            ApplicationError::Timeout(format!("speech service did not answer within {ms}ms"))
        },
        SpeechError::Configuration(e) => ApplicationError::Configuration(e),
        e if e.is_input_error() => step(FailureKind::Input, e.to_string()),
        e => step(FailureKind::Upstream, e.to_string()),
    }
}

fn transcription_error(kind: FailureKind, message: String) -> ApplicationError {
    ApplicationError::transcription(kind, message)
}

/// Synthesis only speaks the tutor's reply, so any text the engine rejects is
/// an upstream failure
fn synthesis_error(_kind: FailureKind, message: String) -> ApplicationError {
    ApplicationError::synthesis(FailureKind::Upstream, message)
}

/// Adapter for speech-to-text engines
pub struct TranscriptionAdapter {
    engine: Arc<dyn SpeechToText>,
}

impl std::fmt::Debug for TranscriptionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionAdapter")
            .field("model", &self.engine.model_name())
            .finish()
    }
}

impl TranscriptionAdapter {
    /// Create an adapter for the configured speech-to-text provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to initialize.
    pub fn new(config: &SpeechConfig) -> Result<Self, ApplicationError> {
        let engine: Arc<dyn SpeechToText> = match config.stt_provider {
            SpeechProvider::OpenAI => Arc::new(
                OpenAISpeechProvider::new(config.clone())
                    .map_err(|e| ApplicationError::Configuration(e.to_string()))?,
            ),
            SpeechProvider::Local => Arc::new(
                WhisperCppProvider::new(
                    config.local.clone(),
                    config.language.clone(),
                    config.timeout_ms,
                )
                .map_err(|e| ApplicationError::Configuration(e.to_string()))?,
            ),
        };

        info!(
            provider = ?config.stt_provider,
            model = %engine.model_name(),
            "Speech-to-text engine ready"
        );

        Ok(Self::with_engine(engine))
    }

    /// Create an adapter around an existing engine
    pub fn with_engine(engine: Arc<dyn SpeechToText>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TranscriptionPort for TranscriptionAdapter {
    #[instrument(skip(self, path), fields(format = %format, model = %self.engine.model_name()))]
    async fn transcribe_file(
        &self,
        path: &Path,
        format: AudioFormat,
    ) -> Result<TranscriptionResult, ApplicationError> {
        let transcription = self
            .engine
            .transcribe_file(path, format)
            .await
            .map_err(|e| map_error(e, transcription_error))?;

        debug!(
            text_len = transcription.text.len(),
            language = ?transcription.language,
            "Transcription complete"
        );

        Ok(TranscriptionResult {
            text: transcription.text,
            detected_language: transcription.language,
            duration_ms: transcription.duration_ms,
        })
    }

    async fn is_available(&self) -> bool {
        self.engine.is_available().await
    }
}

/// Adapter for text-to-speech engines
pub struct SynthesisAdapter {
    engine: Arc<dyn TextToSpeech>,
    voice: Option<String>,
}

impl std::fmt::Debug for SynthesisAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisAdapter")
            .field("model", &self.engine.model_name())
            .field("voice", &self.voice)
            .finish()
    }
}

impl SynthesisAdapter {
    /// Create an adapter backed by OpenAI text-to-speech
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to initialize.
    pub fn new(config: &SpeechConfig) -> Result<Self, ApplicationError> {
        let provider = OpenAISpeechProvider::new(config.clone())
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;
        Ok(Self::with_engine(Arc::new(provider)))
    }

    /// Create an adapter around an existing engine
    pub fn with_engine(engine: Arc<dyn TextToSpeech>) -> Self {
        Self {
            engine,
            voice: None,
        }
    }

    /// Speak with `voice` instead of the engine default
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }
}

#[async_trait]
impl SynthesisPort for SynthesisAdapter {
    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.engine.model_name()))]
    async fn synthesize(&self, text: String) -> Result<SynthesizedAudio, ApplicationError> {
        let audio = self
            .engine
            .synthesize(&text, self.voice.as_deref())
            .await
            .map_err(|e| map_error(e, synthesis_error))?;

        debug!(
            audio_size = audio.size_bytes(),
            format = %audio.format(),
            "Synthesis complete"
        );

        let format = audio.format();
        Ok(SynthesizedAudio {
            data: audio.into_data(),
            format,
        })
    }

    async fn is_available(&self) -> bool {
        self.engine.is_available().await
    }
}
