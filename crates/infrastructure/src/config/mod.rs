//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `media`: Upload and artifact storage
//! - `dialogue`: History bounds for tutor prompts
//!
//! Inference and speech settings are the `ai_core` and `ai_speech` configs.

mod dialogue;
mod media;
mod server;

use std::{collections::HashMap, fmt, path::Path};

use ai_core::InferenceConfig;
use ai_speech::SpeechConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use dialogue::DialogueConfig;
pub use media::MediaConfig;
pub use server::{LogFormat, ServerConfig};

/// Prefix for environment overrides, e.g. `LINGOTUTOR_SERVER__PORT`
pub const ENV_PREFIX: &str = "LINGOTUTOR";

/// Shared key for both OpenAI clients when none is configured
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - error details are shown to clients
    #[default]
    Development,
    /// Production environment - internal error details are hidden
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat completion configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Speech-to-text and text-to-speech configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Transient media storage
    #[serde(default)]
    pub media: MediaConfig,

    /// History bounds for tutor prompts
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (optional), the environment and
    /// `OPENAI_API_KEY`
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut config = Self::load_from(Some(Path::new("config")), None)?;
        config.apply_openai_key(
            std::env::var(OPENAI_API_KEY_VAR)
                .ok()
                .map(SecretString::from),
        );
        Ok(config)
    }

    /// Load configuration from an optional file and environment source
    ///
    /// With `env = None` the process environment is read.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(false));
        }

        // e.g. LINGOTUTOR_SERVER__PORT=8080, LINGOTUTOR_SPEECH__LOCAL__THREADS=2
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .source(env),
        );

        builder.build()?.try_deserialize()
    }

    /// Fill in missing OpenAI keys
    ///
    /// `fallback` fills whichever of the inference and speech keys is unset.
    /// A speech section without a key otherwise borrows the inference key.
    pub fn apply_openai_key(&mut self, fallback: Option<SecretString>) {
        if let Some(key) = fallback.filter(|k| !k.expose_secret().is_empty()) {
            if is_blank(self.inference.api_key.as_deref()) {
                debug!("Using {} for inference", OPENAI_API_KEY_VAR);
                self.inference.api_key = Some(key.expose_secret().to_owned());
            }
            if is_blank(self.speech.openai_api_key.as_deref()) {
                debug!("Using {} for speech", OPENAI_API_KEY_VAR);
                self.speech.openai_api_key = Some(key.expose_secret().to_owned());
            }
        }

        if is_blank(self.speech.openai_api_key.as_deref())
            && !is_blank(self.inference.api_key.as_deref())
        {
            self.speech.openai_api_key.clone_from(&self.inference.api_key);
        }
    }

    /// Whether this is a production deployment
    pub const fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }
        if self.server.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes must be greater than 0".to_string());
        }
        self.inference
            .validate()
            .map_err(|e| format!("inference: {e}"))?;
        self.speech.validate().map_err(|e| format!("speech: {e}"))?;
        self.media.validate()?;
        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
