//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: OpenAI chat
//! completions, speech-to-text, text-to-speech and local media storage.
//! Also owns configuration loading and logging setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, DialogueConfig, Environment, LogFormat, MediaConfig, ServerConfig,
};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
