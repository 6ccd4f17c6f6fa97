//! Voice turn handler: audio in, spoken reply out

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{
    chat::{HistoryEntry, MAX_HISTORY_ENTRIES, history_messages},
    upload::read_audio_upload,
};
use crate::{error::ApiError, state::AppState};

/// Voice turn response body
#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    /// What the learner said
    pub transcription: String,
    /// Tutor reply
    pub response: String,
    /// Artifact id of the spoken reply
    pub audio: String,
}

/// Parse the optional `history` part (a JSON array of `{role, content}`)
fn parse_history_part(raw: Option<&str>) -> Result<Vec<HistoryEntry>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };

    let entries: Vec<HistoryEntry> = serde_json::from_str(raw)
        .map_err(|e| ApiError::BadRequest(format!("history is not a valid JSON array: {e}")))?;

    if entries.len() as u64 > MAX_HISTORY_ENTRIES {
        return Err(ApiError::BadRequest(
            "history: too many history entries".to_string(),
        ));
    }
    Ok(entries)
}

/// Run a full voice turn
#[instrument(skip(state, multipart))]
pub async fn voice_turn(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TurnResponse>, ApiError> {
    let upload = read_audio_upload(multipart?).await?;
    let entries = parse_history_part(upload.history.as_deref())?;
    let history = history_messages(&entries)?;

    let outcome = state
        .pipeline
        .run_voice_turn(upload.data, upload.format, history)
        .await?;

    Ok(Json(TurnResponse {
        transcription: outcome.transcription,
        response: outcome.response,
        audio: outcome.audio.to_string(),
    }))
}
