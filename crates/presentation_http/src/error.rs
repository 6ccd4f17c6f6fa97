//! API error handling
//!
//! Every failure leaves the server as `{error, code, details?}`. In
//! production, upstream and internal error details are replaced by generic
//! messages.

use std::sync::atomic::{AtomicBool, Ordering};

use application::{ApplicationError, FailureKind};
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Global flag to control error detail exposure
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

/// Configure whether internal error details should be exposed in responses.
///
/// Set to `false` in production so upstream messages and internal causes
/// never reach clients.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

/// Pipeline step a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Transcription,
    Dialogue,
    Synthesis,
}

impl Step {
    const fn code(self) -> &'static str {
        match self {
            Self::Transcription => "transcription_error",
            Self::Dialogue => "dialogue_error",
            Self::Synthesis => "synthesis_error",
        }
    }

    const fn generic_message(self) -> &'static str {
        match self {
            Self::Transcription => "Speech could not be transcribed",
            Self::Dialogue => "The tutor could not reply",
            Self::Synthesis => "The reply could not be spoken",
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("{step:?} failed ({kind}): {message}")]
    Step {
        step: Step,
        kind: FailureKind,
        message: String,
    },

    #[error("Artifact not found")]
    ArtifactNotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Status code and body for this error
    ///
    /// With `expose = false` only caller-facing input messages are kept.
    pub fn render(&self, expose: bool) -> (StatusCode, ErrorResponse) {
        let (status, code, error, details) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                msg.clone(),
                None,
            ),
            Self::Step {
                step,
                kind: FailureKind::Input,
                message,
            } => (StatusCode::BAD_REQUEST, step.code(), message.clone(), None),
            Self::Step {
                step,
                kind: FailureKind::Upstream,
                message,
            } => {
                let error = if expose {
                    message.clone()
                } else {
                    step.generic_message().to_string()
                };
                (StatusCode::BAD_GATEWAY, step.code(), error, None)
            },
            Self::ArtifactNotFound => (
                StatusCode::NOT_FOUND,
                "artifact_not_found",
                "Audio artifact not found".to_string(),
                None,
            ),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Upstream rate limit exceeded".to_string(),
                None,
            ),
            Self::UpstreamTimeout(msg) => (
                StatusCode::GATEWAY_TIMEOUT,
                "upstream_timeout",
                "Upstream service timed out".to_string(),
                expose.then(|| msg.clone()),
            ),
            Self::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
                expose.then(|| msg.clone()),
            ),
        };

        (
            status,
            ErrorResponse {
                error,
                code: code.to_string(),
                details,
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.render(should_expose_details());
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Transcription { kind, message } => Self::Step {
                step: Step::Transcription,
                kind,
                message,
            },
            ApplicationError::Dialogue { kind, message } => Self::Step {
                step: Step::Dialogue,
                kind,
                message,
            },
            ApplicationError::Synthesis { kind, message } => Self::Step {
                step: Step::Synthesis,
                kind,
                message,
            },
            ApplicationError::ArtifactNotFound(_) => Self::ArtifactNotFound,
            ApplicationError::RateLimited => Self::RateLimited,
            ApplicationError::Timeout(msg) => Self::UpstreamTimeout(msg),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(err: ApiError, expose: bool) -> (StatusCode, ErrorResponse) {
        err.render(expose)
    }

    #[test]
    fn step_input_errors_are_bad_requests() {
        for (source, code) in [
            (
                ApplicationError::transcription(FailureKind::Input, "empty"),
                "transcription_error",
            ),
            (
                ApplicationError::dialogue(FailureKind::Input, "empty"),
                "dialogue_error",
            ),
            (
                ApplicationError::synthesis(FailureKind::Input, "empty"),
                "synthesis_error",
            ),
        ] {
            let (status, body) = render(source.into(), false);
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body.code, code);
            assert_eq!(body.error, "empty");
        }
    }

    #[test]
    fn step_upstream_errors_are_bad_gateway() {
        let source = ApplicationError::dialogue(FailureKind::Upstream, "server error 503");
        let (status, body) = render(source.into(), true);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "dialogue_error");
        assert_eq!(body.error, "server error 503");
    }

    #[test]
    fn upstream_messages_hidden_in_production() {
        let source = ApplicationError::transcription(
            FailureKind::Upstream,
            "whisper-cli exited: /opt/models/ggml.bin",
        );
        let (_, body) = render(source.into(), false);
        assert_eq!(body.error, "Speech could not be transcribed");
        assert!(!body.error.contains("/opt"));
    }

    #[test]
    fn artifact_not_found_never_echoes_identifier() {
        let source = ApplicationError::ArtifactNotFound("../../etc/passwd".to_string());
        let (status, body) = render(source.into(), true);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "artifact_not_found");
        assert!(!body.error.contains("passwd"));
    }

    #[test]
    fn rate_limit_and_timeout_statuses() {
        let (status, body) = render(ApplicationError::RateLimited.into(), true);
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.code, "rate_limited");

        let (status, body) = render(ApplicationError::Timeout("30s".to_string()).into(), true);
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body.code, "upstream_timeout");
    }

    #[test]
    fn internal_details_only_outside_production() {
        let err = || ApiError::from(ApplicationError::Configuration("no api key".to_string()));

        let (status, body) = render(err(), true);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.details.as_deref(), Some("no api key"));

        let (_, body) = render(err(), false);
        assert_eq!(body.code, "internal_error");
        assert!(body.details.is_none());
    }

    #[test]
    fn error_response_omits_empty_details() {
        let (_, body) = render(ApiError::BadRequest("nope".to_string()), true);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "bad_request");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn into_response_uses_rendered_status() {
        let response = ApiError::PayloadTooLarge("limit".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
