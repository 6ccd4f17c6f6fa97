//! Media store port - Short-lived audio files on local storage
//!
//! Nothing outside the store touches storage directly: uploads are staged
//! and discarded through it, synthesized replies are kept in it until they
//! are fetched or expire.

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{ArtifactId, AudioArtifact, AudioFormat};
#[cfg(test)]
use mockall::automock;
use tempfile::TempPath;

use crate::error::ApplicationError;

/// An uploaded audio blob written to a temporary file
///
/// The file is deleted when the upload is dropped, so a turn that is
/// abandoned mid-way (client gone, shutdown) still leaves nothing behind.
#[derive(Debug)]
pub struct StagedUpload {
    file: TempPath,
    /// Declared format of the upload
    pub format: AudioFormat,
    /// Number of bytes written
    pub size_bytes: u64,
}

impl StagedUpload {
    /// Take ownership of the file at `path`
    ///
    /// Fails only for an empty or unresolvable relative path.
    pub fn new(
        path: impl Into<PathBuf>,
        format: AudioFormat,
        size_bytes: u64,
    ) -> io::Result<Self> {
        Ok(Self {
            file: TempPath::try_from_path(path)?,
            format,
            size_bytes,
        })
    }

    /// Location of the temporary file
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Delete the file now, treating an already missing file as deleted
    pub fn remove(self) -> io::Result<()> {
        match self.file.close() {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Give up ownership without deleting the file
    pub fn release(mut self) -> PathBuf {
        self.file.disable_cleanup(true);
        self.file.to_path_buf()
    }
}

/// Bytes of an artifact together with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactContent {
    /// Artifact metadata
    pub artifact: AudioArtifact,
    /// Stored audio bytes
    pub data: Vec<u8>,
}

impl ArtifactContent {
    /// MIME type to serve the bytes with
    pub const fn mime_type(&self) -> &'static str {
        self.artifact.mime_type()
    }
}

/// Port for the transient media store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaStorePort: Send + Sync {
    /// Write an upload to a fresh temporary file
    async fn stage_upload(
        &self,
        data: Vec<u8>,
        format: AudioFormat,
    ) -> Result<StagedUpload, ApplicationError>;

    /// Delete a staged upload
    ///
    /// Dropping the upload deletes it too; this reports whether the
    /// deletion worked.
    async fn discard_upload(&self, upload: StagedUpload) -> Result<(), ApplicationError>;

    /// Store synthesized audio under a fresh artifact id
    async fn store_artifact(
        &self,
        data: Vec<u8>,
        format: AudioFormat,
    ) -> Result<AudioArtifact, ApplicationError>;

    /// Read a live artifact, leaving it in place
    ///
    /// Fails with [`ApplicationError::ArtifactNotFound`] when the id is
    /// unknown or expired, or the file is missing or outside the artifact
    /// directory.
    async fn read_artifact(&self, id: ArtifactId) -> Result<ArtifactContent, ApplicationError>;

    /// Read a live artifact and delete it
    ///
    /// The artifact stops being live before its bytes are read, so of any
    /// number of concurrent calls for one id at most one succeeds. Fails like
    /// [`MediaStorePort::read_artifact`].
    async fn take_artifact(&self, id: ArtifactId) -> Result<ArtifactContent, ApplicationError>;

    /// Delete every artifact expired at `now`, returning how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, ApplicationError>;

    /// Number of artifacts currently held
    fn live_artifacts(&self) -> usize;
}
