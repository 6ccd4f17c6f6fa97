//! Multipart audio uploads

use axum::extract::Multipart;
use domain::AudioFormat;
use tracing::debug;

use crate::error::ApiError;

/// Name of the part carrying the audio file
pub const FILE_FIELD: &str = "file";
/// Name of the optional part carrying the JSON history
pub const HISTORY_FIELD: &str = "history";

/// Audio read from a multipart form
#[derive(Debug)]
pub struct AudioUpload {
    pub data: Vec<u8>,
    pub format: AudioFormat,
    /// Raw `history` part, if one was sent
    pub history: Option<String>,
}

/// Collect the `file` part (and `history`, when present)
///
/// The format comes from the part's content type, then the file name
/// extension, then defaults to mp3. Unknown parts are skipped.
pub async fn read_audio_upload(mut multipart: Multipart) -> Result<AudioUpload, ApiError> {
    let mut audio = None;
    let mut history = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let format = AudioFormat::detect(field.content_type(), field.file_name());
                let data = field.bytes().await?;
                audio = Some((data.to_vec(), format));
            },
            HISTORY_FIELD => history = Some(field.text().await?),
            other => debug!(field = other, "Ignoring multipart field"),
        }
    }

    let (data, format) = audio
        .ok_or_else(|| ApiError::BadRequest(format!("missing multipart field `{FILE_FIELD}`")))?;

    Ok(AudioUpload {
        data,
        format,
        history,
    })
}
