//! Speech processing errors

use thiserror::Error;

/// Errors that can occur during speech processing
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Failed to connect to speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to speech service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Invalid audio format or corrupted data
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// Text that the synthesis engine cannot accept
    #[error("Invalid text: {0}")]
    InvalidText(String),

    /// Transcription failed
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Synthesis failed
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Invalid response from service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during processing
    #[error("Speech processing timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Voice not found
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Service unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Provider not available (not installed or configured)
    #[error("Provider not available: {0}")]
    NotAvailable(String),
}

impl SpeechError {
    /// Whether the error was caused by the submitted audio or text
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidAudio(_) | Self::InvalidText(_))
    }
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(0)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failed_error_message() {
        let err = SpeechError::ConnectionFailed("refused".to_string());
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn invalid_audio_error_message() {
        let err = SpeechError::InvalidAudio("corrupt header".to_string());
        assert_eq!(err.to_string(), "Invalid audio: corrupt header");
    }

    #[test]
    fn invalid_text_error_message() {
        let err = SpeechError::InvalidText("too long".to_string());
        assert_eq!(err.to_string(), "Invalid text: too long");
    }

    #[test]
    fn transcription_failed_error_message() {
        let err = SpeechError::TranscriptionFailed("no speech detected".to_string());
        assert_eq!(err.to_string(), "Transcription failed: no speech detected");
    }

    #[test]
    fn synthesis_failed_error_message() {
        let err = SpeechError::SynthesisFailed("engine crashed".to_string());
        assert_eq!(err.to_string(), "Synthesis failed: engine crashed");
    }

    #[test]
    fn timeout_error_message() {
        let err = SpeechError::Timeout(30000);
        assert_eq!(err.to_string(), "Speech processing timeout after 30000ms");
    }

    #[test]
    fn rate_limited_error_message() {
        assert_eq!(SpeechError::RateLimited.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn input_errors_are_classified() {
        assert!(SpeechError::InvalidAudio(String::new()).is_input_error());
        assert!(SpeechError::InvalidText(String::new()).is_input_error());
        assert!(!SpeechError::RateLimited.is_input_error());
        assert!(!SpeechError::TranscriptionFailed(String::new()).is_input_error());
    }
}
