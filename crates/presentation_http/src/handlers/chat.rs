//! Text chat handler

use application::parse_history;
use axum::{Json, extract::State};
use domain::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{error::ApiError, middleware::ValidatedJson, state::AppState};

/// Upper bound on history entries accepted in one request
pub const MAX_HISTORY_ENTRIES: u64 = 1_000;

/// Upper bound on the length of a single user message
pub const MAX_MESSAGE_CHARS: u64 = 16_000;

/// One prior exchange as sent by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

/// Convert client history into chat messages, keeping order
pub(crate) fn history_messages(entries: &[HistoryEntry]) -> Result<Vec<ChatMessage>, ApiError> {
    parse_history(
        entries
            .iter()
            .map(|e| (e.role.as_str(), e.content.as_str())),
    )
    .map_err(ApiError::from)
}

/// Chat request body
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    /// The learner's message; missing or blank is a dialogue input error
    #[serde(default)]
    #[validate(length(max = MAX_MESSAGE_CHARS, message = "message is too long"))]
    pub message: Option<String>,
    /// Prior turns, oldest first
    #[serde(default)]
    #[validate(length(max = MAX_HISTORY_ENTRIES, message = "too many history entries"))]
    pub history: Vec<HistoryEntry>,
}

/// Chat response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Tutor reply
    pub response: String,
    /// Artifact id of the spoken reply, fetch via `/audio/{id}`
    pub audio: String,
}

/// Handle a chat request
#[instrument(
    skip(state, request),
    fields(history_len = request.history.len())
)]
pub async fn chat(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let history = history_messages(&request.history)?;
    let message = request.message.unwrap_or_default();

    let outcome = state.pipeline.chat(&message, history).await?;

    Ok(Json(ChatResponse {
        response: outcome.response,
        audio: outcome.audio.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_history_defaults_to_empty() {
        let request: ChatRequest = serde_json::from_str(r#"{"message": "Hello"}"#).unwrap();
        assert_eq!(request.message.as_deref(), Some("Hello"));
        assert!(request.history.is_empty());
    }

    #[test]
    fn chat_request_message_may_be_missing() {
        let request: ChatRequest = serde_json::from_str(r#"{"history": []}"#).unwrap();
        assert!(request.message.is_none());
    }

    #[test]
    fn overlong_message_fails_validation() {
        let request = ChatRequest {
            message: Some("a".repeat(MAX_MESSAGE_CHARS as usize + 1)),
            history: Vec::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn oversized_history_fails_validation() {
        let entry = HistoryEntry {
            role: "user".to_string(),
            content: "hi".to_string(),
        };
        let mut request = ChatRequest {
            message: Some("Next".to_string()),
            history: vec![entry; MAX_HISTORY_ENTRIES as usize],
        };
        assert!(request.validate().is_ok());

        request.history.push(request.history[0].clone());
        assert!(request.validate().is_err());
    }

    #[test]
    fn history_keeps_order() {
        let entries = vec![
            HistoryEntry {
                role: "user".to_string(),
                content: "first".to_string(),
            },
            HistoryEntry {
                role: "assistant".to_string(),
                content: "second".to_string(),
            },
        ];
        let messages = history_messages(&entries).unwrap();
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
    }

    #[test]
    fn unknown_role_is_dialogue_input_error() {
        let entries = vec![HistoryEntry {
            role: "narrator".to_string(),
            content: "Once upon a time".to_string(),
        }];
        let err = history_messages(&entries).unwrap_err();
        let (status, body) = err.render(true);
        assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "dialogue_error");
        assert!(body.error.starts_with("history[0]"));
    }
}
