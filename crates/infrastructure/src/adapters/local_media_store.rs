//! Local media store - Implements MediaStorePort on the local filesystem
//!
//! Layout below the configured root:
//! - `uploads/`: staged client audio, one `upload-<uuid>.<ext>` per request
//! - `artifacts/`: synthesized replies, one `<artifact-id>.<ext>` each
//!
//! Both directories are emptied when the store is opened; nothing in them
//! survives a restart.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use application::{
    error::ApplicationError,
    ports::{ArtifactContent, MediaStorePort, StagedUpload},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::{ArtifactId, AudioArtifact, AudioFormat};
use parking_lot::RwLock;
use tempfile::TempPath;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::MediaConfig;

/// Filesystem-backed store for uploads and artifacts
#[derive(Debug)]
pub struct LocalMediaStore {
    upload_dir: PathBuf,
    artifact_dir: PathBuf,
    ttl: Duration,
    registry: RwLock<HashMap<ArtifactId, AudioArtifact>>,
}

impl LocalMediaStore {
    /// Open the store, creating its directories and purging orphans
    pub fn open(config: &MediaConfig) -> Result<Self, ApplicationError> {
        let ttl_secs = i64::try_from(config.artifact_ttl_secs).map_err(|_| {
            ApplicationError::Configuration("media.artifact_ttl_secs is too large".to_string())
        })?;
        let ttl = Duration::try_seconds(ttl_secs).ok_or_else(|| {
            ApplicationError::Configuration("media.artifact_ttl_secs is too large".to_string())
        })?;

        let upload_dir = prepare_dir(&config.upload_dir())?;
        let artifact_dir = prepare_dir(&config.artifact_dir())?;

        let orphans = purge_dir(&upload_dir) + purge_dir(&artifact_dir);
        if orphans > 0 {
            info!(orphans, "Removed files left over from a previous run");
        }

        info!(
            artifact_dir = %artifact_dir.display(),
            ttl_secs,
            "Media store ready"
        );

        Ok(Self {
            upload_dir,
            artifact_dir,
            ttl,
            registry: RwLock::new(HashMap::new()),
        })
    }

    /// Directory holding synthesized artifacts
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Directory holding staged uploads
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    fn forget(&self, id: ArtifactId) -> Option<AudioArtifact> {
        self.registry.write().remove(&id)
    }

    /// Resolve an artifact path, refusing anything outside the artifact directory
    fn confined(&self, path: &Path) -> Option<PathBuf> {
        let resolved = path.canonicalize().ok()?;
        resolved.starts_with(&self.artifact_dir).then_some(resolved)
    }

    /// Read the bytes of a registered artifact
    async fn load(&self, artifact: &AudioArtifact) -> Result<Vec<u8>, ApplicationError> {
        let not_found = || ApplicationError::ArtifactNotFound(artifact.id.to_string());

        if artifact.is_expired(Utc::now()) {
            debug!(artifact_id = %artifact.id, "Artifact expired before fetch");
            return Err(not_found());
        }

        let Some(path) = self.confined(artifact.path()) else {
            warn!(artifact_id = %artifact.id, "Artifact file missing or outside artifact directory");
            return Err(not_found());
        };

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(storage_error("read artifact", &e)),
        }
    }

    /// Delete an artifact's file once it is out of the registry
    async fn delete_file(&self, artifact: &AudioArtifact) {
        if !artifact.path().starts_with(&self.artifact_dir) {
            return;
        }
        if let Err(e) = remove_quietly(artifact.path()).await {
            warn!(artifact_id = %artifact.id, error = %e, "Failed to remove artifact file");
        }
    }
}

fn prepare_dir(dir: &Path) -> Result<PathBuf, ApplicationError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ApplicationError::Configuration(format!("Cannot create media directory: {e}"))
    })?;
    dir.canonicalize().map_err(|e| {
        ApplicationError::Configuration(format!("Cannot resolve media directory: {e}"))
    })
}

fn purge_dir(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to remove orphaned media file");
                false
            },
        })
        .count()
}

async fn remove_quietly(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn storage_error(action: &str, e: &io::Error) -> ApplicationError {
    ApplicationError::Internal(format!("Failed to {action}: {e}"))
}

#[async_trait]
impl MediaStorePort for LocalMediaStore {
    #[instrument(skip(self, data), fields(size = data.len(), format = %format))]
    async fn stage_upload(
        &self,
        data: Vec<u8>,
        format: AudioFormat,
    ) -> Result<StagedUpload, ApplicationError> {
        let name = format!("upload-{}.{}", Uuid::new_v4(), format.extension());
        let size_bytes = data.len() as u64;

        // Owned before the write so a failed or abandoned write is cleaned up
        let upload = StagedUpload::new(self.upload_dir.join(name), format, size_bytes)
            .map_err(|e| storage_error("stage upload", &e))?;

        tokio::fs::write(upload.path(), data)
            .await
            .map_err(|e| storage_error("stage upload", &e))?;

        debug!("Upload staged");
        Ok(upload)
    }

    #[instrument(skip(self, upload))]
    async fn discard_upload(&self, upload: StagedUpload) -> Result<(), ApplicationError> {
        if !upload.path().starts_with(&self.upload_dir) {
            upload.release();
            return Err(ApplicationError::Internal(
                "Refusing to discard a file outside the upload directory".to_string(),
            ));
        }

        upload
            .remove()
            .map_err(|e| storage_error("discard upload", &e))?;

        debug!("Upload discarded");
        Ok(())
    }

    #[instrument(skip(self, data), fields(size = data.len(), format = %format))]
    async fn store_artifact(
        &self,
        data: Vec<u8>,
        format: AudioFormat,
    ) -> Result<AudioArtifact, ApplicationError> {
        let id = ArtifactId::new();
        let size_bytes = data.len() as u64;

        // Removed on drop until the artifact is registered
        let mut pending =
            TempPath::try_from_path(self.artifact_dir.join(id.file_name(format.extension())))
                .map_err(|e| storage_error("store artifact", &e))?;

        tokio::fs::write(&pending, data)
            .await
            .map_err(|e| storage_error("store artifact", &e))?;

        pending.disable_cleanup(true);
        let path = pending.to_path_buf();

        let artifact = AudioArtifact::new(id, path, format, size_bytes, Utc::now(), self.ttl);
        self.registry.write().insert(id, artifact.clone());

        debug!(artifact_id = %id, "Artifact stored");
        Ok(artifact)
    }

    #[instrument(skip(self))]
    async fn read_artifact(&self, id: ArtifactId) -> Result<ArtifactContent, ApplicationError> {
        let artifact = self
            .registry
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApplicationError::ArtifactNotFound(id.to_string()))?;

        match self.load(&artifact).await {
            Ok(data) => Ok(ArtifactContent { artifact, data }),
            Err(e @ ApplicationError::ArtifactNotFound(_)) => {
                if let Some(stale) = self.forget(id) {
                    self.delete_file(&stale).await;
                }
                Err(e)
            },
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn take_artifact(&self, id: ArtifactId) -> Result<ArtifactContent, ApplicationError> {
        let artifact = self
            .forget(id)
            .ok_or_else(|| ApplicationError::ArtifactNotFound(id.to_string()))?;

        let loaded = self.load(&artifact).await;
        self.delete_file(&artifact).await;

        let data = loaded?;
        debug!(artifact_id = %id, "Artifact taken");
        Ok(ArtifactContent { artifact, data })
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, ApplicationError> {
        let expired: Vec<AudioArtifact> = {
            let mut registry = self.registry.write();
            let ids: Vec<ArtifactId> = registry
                .values()
                .filter(|artifact| artifact.is_expired(now))
                .map(|artifact| artifact.id)
                .collect();
            ids.iter().filter_map(|id| registry.remove(id)).collect()
        };

        for artifact in &expired {
            self.delete_file(artifact).await;
        }

        Ok(expired.len())
    }

    fn live_artifacts(&self) -> usize {
        self.registry.read().len()
    }
}
