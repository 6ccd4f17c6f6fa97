//! OpenAI Speech Provider
//!
//! Implements `SpeechToText` using OpenAI Whisper and `TextToSpeech` using OpenAI TTS.
//!
//! # Supported Audio Formats
//!
//! ## STT (Whisper)
//! - mp3, m4a, wav, webm, ogg, flac
//!
//! ## TTS
//! - mp3, opus, aac, flac, wav

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SpeechToText, TextToSpeech};
use crate::types::{AudioData, AudioFormat, Transcription};

/// Maximum input length accepted by the TTS endpoint
const MAX_TTS_CHARS: usize = 4096;

/// OpenAI speech provider implementing both STT and TTS
#[derive(Debug, Clone)]
pub struct OpenAISpeechProvider {
    client: Client,
    config: SpeechConfig,
}

impl OpenAISpeechProvider {
    /// Create a new OpenAI speech provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Get the API key
    fn api_key(&self) -> &str {
        self.config.openai_api_key.as_deref().unwrap_or_default()
    }

    fn base_url(&self) -> &str {
        self.config.openai_base_url.trim_end_matches('/')
    }

    /// Build the STT endpoint URL
    fn stt_url(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url())
    }

    /// Build the TTS endpoint URL
    fn tts_url(&self) -> String {
        format!("{}/audio/speech", self.base_url())
    }

    /// Whether Whisper accepts the container as uploaded
    const fn whisper_accepts(format: AudioFormat) -> bool {
        matches!(
            format,
            AudioFormat::Mp3
                | AudioFormat::Wav
                | AudioFormat::Ogg
                | AudioFormat::Flac
                | AudioFormat::Webm
                | AudioFormat::M4a
        )
    }

    /// Convert AudioFormat to OpenAI TTS response format string
    const fn audio_format_to_response_format(format: AudioFormat) -> &'static str {
        match format {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus | AudioFormat::Ogg | AudioFormat::Webm => "opus",
            AudioFormat::M4a => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Wav => "wav",
        }
    }

    /// Convert OpenAI response format string back to AudioFormat
    fn response_format_to_audio_format(format: &str) -> AudioFormat {
        match format {
            "opus" => AudioFormat::Opus,
            "aac" => AudioFormat::M4a,
            "flac" => AudioFormat::Flac,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Mp3,
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> SpeechError {
        if err.is_timeout() {
            SpeechError::Timeout(self.config.timeout_ms)
        } else {
            err.into()
        }
    }

    /// Turn a non-success response into an error
    ///
    /// `fallback` wraps messages that don't match a known error code.
    async fn error_from_response(
        response: Response,
        model: &str,
        fallback: fn(String) -> SpeechError,
    ) -> SpeechError {
        let status = response.status();
        let error_body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %error_body, "OpenAI speech request failed");

        let detail = serde_json::from_str::<ApiError>(&error_body)
            .ok()
            .map(|e| e.error);

        match (status, detail) {
            (StatusCode::TOO_MANY_REQUESTS, _) => SpeechError::RateLimited,
            (_, Some(d)) => match d.code.as_deref() {
                Some("rate_limit_exceeded") => SpeechError::RateLimited,
                Some("model_not_found") => SpeechError::ModelNotAvailable(model.to_string()),
                Some("invalid_voice") => SpeechError::VoiceNotFound(d.message),
                _ if status == StatusCode::BAD_REQUEST => SpeechError::InvalidAudio(d.message),
                _ => fallback(d.message),
            },
            (s, None) if s.is_server_error() => {
                SpeechError::ServiceUnavailable(format!("HTTP {s}: {error_body}"))
            },
            (s, None) => fallback(format!("HTTP {s}: {error_body}")),
        }
    }
}

/// OpenAI Whisper transcription response
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// OpenAI TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

#[async_trait]
impl SpeechToText for OpenAISpeechProvider {
    #[instrument(skip(self, audio), fields(audio_size = audio.size_bytes(), format = %audio.format()))]
    async fn transcribe(&self, audio: AudioData) -> Result<Transcription, SpeechError> {
        debug!("Transcribing audio with OpenAI Whisper");

        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        if !Self::whisper_accepts(audio.format()) {
            return Err(SpeechError::InvalidAudio(format!(
                "Audio format {} is not supported by Whisper",
                audio.format()
            )));
        }

        let filename = audio.filename("audio");
        let mime_type = audio.mime_type();
        let data = audio.into_data();

        let file_part = Part::bytes(data)
            .file_name(filename)
            .mime_str(mime_type)
            .map_err(|e| SpeechError::InvalidAudio(format!("Invalid MIME type: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.config.stt_model.clone())
            .text("language", self.config.language.clone())
            .text("response_format", "verbose_json");

        let response = self
            .client
            .post(self.stt_url())
            .bearer_auth(self.api_key())
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(
                response,
                &self.config.stt_model,
                SpeechError::TranscriptionFailed,
            )
            .await);
        }

        let whisper_response: WhisperResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(
            text_len = whisper_response.text.len(),
            language = ?whisper_response.language,
            "Transcription complete"
        );

        let mut transcription = Transcription::new(whisper_response.text.trim());

        if let Some(lang) = whisper_response.language {
            transcription = transcription.with_language(lang);
        }

        if let Some(duration) = whisper_response.duration {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let duration_ms = (duration * 1000.0) as u64;
            transcription = transcription.with_duration(duration_ms);
        }

        Ok(transcription)
    }

    async fn is_available(&self) -> bool {
        let models_url = format!("{}/models", self.base_url());

        match self
            .client
            .get(&models_url)
            .bearer_auth(self.api_key())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("OpenAI STT availability check failed: {}", e);
                false
            },
        }
    }

    fn model_name(&self) -> &str {
        &self.config.stt_model
    }
}

#[async_trait]
impl TextToSpeech for OpenAISpeechProvider {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioData, SpeechError> {
        debug!("Synthesizing speech with OpenAI TTS");

        if text.trim().is_empty() {
            return Err(SpeechError::InvalidText("Text cannot be empty".to_string()));
        }

        let chars = text.chars().count();
        if chars > MAX_TTS_CHARS {
            return Err(SpeechError::InvalidText(format!(
                "Text too long: {chars} characters exceeds {MAX_TTS_CHARS} limit"
            )));
        }

        let voice = voice.unwrap_or(&self.config.default_voice);
        let response_format = Self::audio_format_to_response_format(self.config.output_format);

        let request = TtsRequest {
            model: &self.config.tts_model,
            input: text,
            voice,
            response_format: Some(response_format),
            speed: if (self.config.speed - 1.0).abs() < f32::EPSILON {
                None
            } else {
                Some(self.config.speed)
            },
        };

        let response = self
            .client
            .post(self.tts_url())
            .bearer_auth(self.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(
                response,
                &self.config.tts_model,
                SpeechError::SynthesisFailed,
            )
            .await);
        }

        let audio_bytes: Bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;

        if audio_bytes.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "TTS returned no audio".to_string(),
            ));
        }

        debug!(audio_size = audio_bytes.len(), "Speech synthesis complete");

        let output_format = Self::response_format_to_audio_format(response_format);
        Ok(AudioData::new(audio_bytes.to_vec(), output_format))
    }

    async fn is_available(&self) -> bool {
        SpeechToText::is_available(self).await
    }

    fn model_name(&self) -> &str {
        &self.config.tts_model
    }

    fn default_voice(&self) -> &str {
        &self.config.default_voice
    }
}
