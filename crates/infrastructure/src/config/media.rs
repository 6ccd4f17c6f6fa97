//! Transient media storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::default_true;

/// Where uploads and synthesized artifacts live, and for how long
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Root directory; `uploads/` and `artifacts/` are created below it
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Seconds an artifact stays fetchable
    #[serde(default = "default_artifact_ttl_secs")]
    pub artifact_ttl_secs: u64,

    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Delete an artifact once it has been fetched
    #[serde(default = "default_true")]
    pub reclaim_on_fetch: bool,
}

fn default_directory() -> PathBuf {
    std::env::temp_dir().join("lingotutor")
}

const fn default_artifact_ttl_secs() -> u64 {
    600 // 10 minutes
}

const fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            artifact_ttl_secs: default_artifact_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            reclaim_on_fetch: true,
        }
    }
}

impl MediaConfig {
    /// Directory for staged uploads
    pub fn upload_dir(&self) -> PathBuf {
        self.directory.join("uploads")
    }

    /// Directory for synthesized artifacts
    pub fn artifact_dir(&self) -> PathBuf {
        self.directory.join("artifacts")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.directory.as_os_str().is_empty() {
            return Err("media.directory cannot be empty".to_string());
        }
        if self.artifact_ttl_secs == 0 {
            return Err("media.artifact_ttl_secs must be greater than 0".to_string());
        }
        if self.sweep_interval_secs == 0 {
            return Err("media.sweep_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
