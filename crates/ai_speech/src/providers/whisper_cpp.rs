//! Whisper.cpp Local Speech-to-Text Provider
//!
//! Implements `SpeechToText` using the whisper.cpp CLI for local transcription.
//!
//! # Prerequisites
//!
//! - whisper.cpp built with its `whisper-cli` binary
//! - A GGML model file (e.g., ggml-base.bin)
//!
//! ```bash
//! git clone https://github.com/ggerganov/whisper.cpp
//! cd whisper.cpp
//! cmake -B build && cmake --build build -j --config Release
//! ./models/download-ggml-model.sh base
//! ```
//!
//! whisper-cli decodes wav, mp3, ogg and flac input itself.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, instrument, warn};

use crate::config::LocalSttConfig;
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::{AudioData, AudioFormat, Transcription};

/// Local STT provider using whisper.cpp
///
/// Concurrent transcriptions are bounded by `max_concurrency`; callers
/// beyond the limit wait for a permit.
#[derive(Debug, Clone)]
pub struct WhisperCppProvider {
    config: LocalSttConfig,
    language: String,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl WhisperCppProvider {
    /// Create a new whisper.cpp provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(
        config: LocalSttConfig,
        language: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;
        if timeout_ms == 0 {
            return Err(SpeechError::Configuration(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        let permits = Arc::new(Semaphore::new(config.max_concurrency));
        Ok(Self {
            config,
            language: language.into(),
            timeout: Duration::from_millis(timeout_ms),
            permits,
        })
    }

    /// Get the whisper.cpp executable path
    fn executable(&self) -> &Path {
        &self.config.executable_path
    }

    /// Get the model path
    fn model(&self) -> &Path {
        &self.config.model_path
    }

    const fn accepts(format: AudioFormat) -> bool {
        matches!(
            format,
            AudioFormat::Wav | AudioFormat::Mp3 | AudioFormat::Ogg | AudioFormat::Flac
        )
    }

    /// Run whisper.cpp on an audio file
    #[instrument(skip(self, audio_path), fields(model = %self.model().display()))]
    async fn run_whisper(&self, audio_path: &Path) -> Result<String, SpeechError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| SpeechError::ServiceUnavailable(e.to_string()))?;

        // whisper-cli appends ".txt" to the --output-file prefix
        let out_dir = TempDir::new().map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to create output directory: {e}"))
        })?;
        let out_prefix = out_dir.path().join("transcript");

        let mut cmd = Command::new(self.executable());
        cmd.arg("-m")
            .arg(self.model())
            .arg("-f")
            .arg(audio_path)
            .arg("--output-txt")
            .arg("--output-file")
            .arg(&out_prefix)
            .arg("--no-timestamps")
            .arg("-t")
            .arg(self.config.threads.to_string())
            .arg("-l")
            .arg(&self.language)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running whisper.cpp: {:?}", cmd);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| {
                #[allow(clippy::cast_possible_truncation)]
                let ms = self.timeout.as_millis() as u64;
                SpeechError::Timeout(ms)
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpeechError::NotAvailable(format!(
                        "whisper.cpp not found at '{}'",
                        self.executable().display()
                    ))
                } else {
                    SpeechError::TranscriptionFailed(format!("Failed to run whisper.cpp: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("whisper.cpp failed: {}", stderr);
            return Err(SpeechError::TranscriptionFailed(format!(
                "whisper.cpp exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = tokio::fs::read_to_string(out_prefix.with_extension("txt"))
            .await
            .map_err(|e| {
                SpeechError::TranscriptionFailed(format!(
                    "Failed to read transcription output: {e}"
                ))
            })?;

        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl SpeechToText for WhisperCppProvider {
    #[instrument(skip(self, audio), fields(format = %audio.format(), audio_size = audio.size_bytes()))]
    async fn transcribe(&self, audio: AudioData) -> Result<Transcription, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        let dir = TempDir::new().map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to create temp directory: {e}"))
        })?;
        let path = dir.path().join(audio.filename("input"));
        tokio::fs::write(&path, audio.data()).await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to write temp file: {e}"))
        })?;

        self.transcribe_file(&path, audio.format()).await
    }

    #[instrument(skip(self, path), fields(format = %format))]
    async fn transcribe_file(
        &self,
        path: &Path,
        format: AudioFormat,
    ) -> Result<Transcription, SpeechError> {
        if !Self::accepts(format) {
            return Err(SpeechError::InvalidAudio(format!(
                "Audio format {format} is not supported by whisper.cpp"
            )));
        }

        let text = self.run_whisper(path).await?;

        if text.is_empty() {
            warn!("whisper.cpp returned empty transcription");
        }

        Ok(Transcription::new(text).with_language(self.language.clone()))
    }

    async fn is_available(&self) -> bool {
        let executable_exists = self.executable().exists()
            || Command::new(self.executable())
                .arg("--help")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .is_ok_and(|s| s.success());

        let model_exists = self.model().exists();

        debug!(
            "whisper.cpp availability: executable={}, model={}",
            executable_exists, model_exists
        );

        executable_exists && model_exists
    }

    fn model_name(&self) -> &str {
        self.model()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper.cpp")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn test_config() -> LocalSttConfig {
        LocalSttConfig {
            executable_path: PathBuf::from("whisper-cli"),
            model_path: PathBuf::from("/models/ggml-base.bin"),
            threads: 4,
            max_concurrency: 1,
        }
    }

    fn provider(config: LocalSttConfig) -> WhisperCppProvider {
        WhisperCppProvider::new(config, "en", 5_000).unwrap()
    }

    #[test]
    fn creates_provider_with_valid_config() {
        assert!(WhisperCppProvider::new(test_config(), "en", 1000).is_ok());
    }

    #[test]
    fn rejects_zero_concurrency() {
        let mut config = test_config();
        config.max_concurrency = 0;
        let result = WhisperCppProvider::new(config, "en", 1000);
        assert!(matches!(result, Err(SpeechError::Configuration(_))));
    }

    #[test]
    fn rejects_zero_timeout() {
        let result = WhisperCppProvider::new(test_config(), "en", 0);
        assert!(matches!(result, Err(SpeechError::Configuration(_))));
    }

    #[test]
    fn model_name_extracts_from_path() {
        assert_eq!(provider(test_config()).model_name(), "ggml-base");
    }

    #[test]
    fn model_name_handles_complex_paths() {
        let mut config = test_config();
        config.model_path = PathBuf::from("/home/pi/models/ggml-small.en.bin");
        assert_eq!(provider(config).model_name(), "ggml-small.en");
    }

    #[tokio::test]
    async fn is_available_returns_false_when_not_installed() {
        let mut config = test_config();
        config.executable_path = PathBuf::from("/nonexistent/whisper-cli");
        assert!(!provider(config).is_available().await);
    }

    #[tokio::test]
    async fn missing_executable_is_not_available_error() {
        let mut config = test_config();
        config.executable_path = PathBuf::from("/nonexistent/whisper-cli");
        let audio = AudioData::new(vec![1, 2, 3], AudioFormat::Wav);

        let result = provider(config).transcribe(audio).await;

        assert!(matches!(result, Err(SpeechError::NotAvailable(_))));
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected_before_running() {
        let audio = AudioData::new(vec![1, 2, 3], AudioFormat::M4a);
        let result = provider(test_config()).transcribe(audio).await;
        assert!(matches!(result, Err(SpeechError::InvalidAudio(_))));
    }

    #[tokio::test]
    async fn empty_audio_is_rejected() {
        let audio = AudioData::new(vec![], AudioFormat::Wav);
        let result = provider(test_config()).transcribe(audio).await;
        assert!(matches!(result, Err(SpeechError::InvalidAudio(_))));
    }
}
