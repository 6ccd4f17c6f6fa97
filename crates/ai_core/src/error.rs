//! Inference errors

use thiserror::Error;

/// Errors that can occur during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to inference server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to inference server failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Model not found or not loaded
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Response parsing failed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request was rejected as malformed or too large
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Timeout during inference
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),

    /// Client could not be built from the configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for InferenceError {
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
    fn timeout_message_includes_duration() {
        assert_eq!(
            InferenceError::Timeout(60000).to_string(),
            "Inference timeout after 60000ms"
        );
    }

    #[test]
    fn rate_limited_message() {
        assert_eq!(InferenceError::RateLimited.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn model_not_available_message() {
        let err = InferenceError::ModelNotAvailable("gpt-x".to_string());
        assert_eq!(err.to_string(), "Model not available: gpt-x");
    }
}
