//! AI Core - Chat-completion engine abstraction
//!
//! Provides the `InferenceEngine` port used by the tutor dialogue step and
//! an implementation for OpenAI-compatible `/chat/completions` servers.

pub mod config;
pub mod error;
pub mod openai;
pub mod ports;

pub use config::InferenceConfig;
pub use error::InferenceError;
pub use openai::OpenAIInferenceEngine;
pub use ports::{InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage};
