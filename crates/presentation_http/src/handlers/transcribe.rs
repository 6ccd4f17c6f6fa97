//! Speech-to-text handler

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::upload::read_audio_upload;
use crate::{error::ApiError, state::AppState};

/// Transcription response body
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub transcription: String,
}

/// Transcribe an uploaded recording
#[instrument(skip(state, multipart))]
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let upload = read_audio_upload(multipart?).await?;
    let result = state.pipeline.transcribe(upload.data, upload.format).await?;

    Ok(Json(TranscribeResponse {
        transcription: result.text,
    }))
}
