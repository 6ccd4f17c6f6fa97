//! Configuration for speech processing

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::AudioFormat;

/// Configuration for speech processing services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speech-to-text backend
    #[serde(default = "default_provider")]
    pub stt_provider: SpeechProvider,

    /// OpenAI API key (Whisper and TTS)
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for custom endpoints)
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Speech-to-text model
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Default voice for TTS
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Output audio format for TTS; replies are served as `audio/mpeg`, so
    /// only mp3 passes validation
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// Language hint passed to transcription (ISO 639-1)
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// TTS speaking speed (0.25 to 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Local whisper.cpp settings, used when `stt_provider = "local"`
    #[serde(default)]
    pub local: LocalSttConfig,
}

/// Speech-to-text backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechProvider {
    /// OpenAI Whisper API
    #[default]
    OpenAI,
    /// Local whisper.cpp
    Local,
}

/// Configuration for the local whisper.cpp CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSttConfig {
    /// Path or name of the whisper.cpp executable
    #[serde(default = "default_executable_path")]
    pub executable_path: PathBuf,

    /// GGML model file
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Threads per transcription
    #[serde(default = "default_threads")]
    pub threads: u16,

    /// Concurrent whisper.cpp processes allowed
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

const fn default_provider() -> SpeechProvider {
    SpeechProvider::OpenAI
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    "nova".to_string()
}

const fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

fn default_language() -> String {
    "en".to_string()
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_speed() -> f32 {
    1.0
}

fn default_executable_path() -> PathBuf {
    PathBuf::from("whisper-cli")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/ggml-base.bin")
}

const fn default_threads() -> u16 {
    4
}

const fn default_max_concurrency() -> usize {
    1
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_provider: default_provider(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
            default_voice: default_voice(),
            output_format: default_output_format(),
            language: default_language(),
            timeout_ms: default_timeout_ms(),
            speed: default_speed(),
            local: LocalSttConfig::default(),
        }
    }
}

impl Default for LocalSttConfig {
    fn default() -> Self {
        Self {
            executable_path: default_executable_path(),
            model_path: default_model_path(),
            threads: default_threads(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl SpeechConfig {
    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            openai_api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        // Synthesis always goes through OpenAI
        if self.openai_api_key.as_deref().is_none_or(str::is_empty) {
            return Err("OpenAI API key is required for speech synthesis".to_string());
        }

        if !(0.25..=4.0).contains(&self.speed) {
            return Err(format!(
                "Speed must be between 0.25 and 4.0, got {}",
                self.speed
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.output_format != AudioFormat::Mp3 {
            return Err(format!(
                "TTS output format must be mp3, got {}",
                self.output_format
            ));
        }

        if self.stt_provider == SpeechProvider::Local {
            self.local.validate()?;
        }

        Ok(())
    }
}

impl LocalSttConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.executable_path.as_os_str().is_empty() {
            return Err("whisper.cpp executable path cannot be empty".to_string());
        }

        if self.model_path.as_os_str().is_empty() {
            return Err("whisper.cpp model path cannot be empty".to_string());
        }

        if self.threads == 0 {
            return Err("whisper.cpp threads must be greater than 0".to_string());
        }

        if self.max_concurrency == 0 {
            return Err("whisper.cpp max_concurrency must be greater than 0".to_string());
        }

        Ok(())
    }
}
