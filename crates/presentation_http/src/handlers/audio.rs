//! Artifact retrieval handler

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

/// Serve the bytes of a synthesized reply
///
/// Anything that is not a live artifact id yields `artifact_not_found`.
#[instrument(skip(state))]
pub async fn get_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let content = state.pipeline.fetch_artifact(&id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content.mime_type()),
            (header::CACHE_CONTROL, "no-store"),
        ],
        content.data,
    )
        .into_response())
}
