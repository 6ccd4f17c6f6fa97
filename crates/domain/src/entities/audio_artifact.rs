//! Synthesized audio held on local storage until fetched or expired

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::{ArtifactId, AudioFormat};

/// A generated audio file addressed by an opaque identifier
///
/// The file path never leaves the process; clients only see [`ArtifactId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    /// Opaque identifier returned to clients
    pub id: ArtifactId,
    /// Location inside the artifact directory
    pub file_path: PathBuf,
    /// Container format of the stored bytes
    pub format: AudioFormat,
    /// When the artifact was written
    pub created_at: DateTime<Utc>,
    /// When the artifact becomes eligible for reclamation
    pub expires_at: DateTime<Utc>,
    /// Size of the stored file
    pub size_bytes: u64,
}

impl AudioArtifact {
    /// Describe a freshly written artifact
    pub fn new(
        id: ArtifactId,
        file_path: impl Into<PathBuf>,
        format: AudioFormat,
        size_bytes: u64,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id,
            file_path: file_path.into(),
            format,
            created_at,
            expires_at: created_at + ttl,
            size_bytes,
        }
    }

    /// MIME type served with the artifact bytes
    pub const fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Whether the artifact's TTL has elapsed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Internal storage path
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}
