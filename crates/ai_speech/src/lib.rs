//! AI Speech - Speech-to-Text and Text-to-Speech abstractions
//!
//! Provides traits and implementations for speech processing:
//! - `SpeechToText` - Transcribe audio to text (STT)
//! - `TextToSpeech` - Synthesize speech from text (TTS)
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! # Supported Providers
//!
//! - OpenAI Whisper (STT) and TTS API
//! - Local whisper.cpp CLI (STT)
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{OpenAISpeechProvider, SpeechToText, TextToSpeech, AudioData, AudioFormat};
//!
//! let provider = OpenAISpeechProvider::new(config)?;
//!
//! let audio = AudioData::new(bytes, AudioFormat::Mp3);
//! let transcription = provider.transcribe(audio).await?;
//!
//! let reply = provider.synthesize("Nice to meet you!", None).await?;
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::{LocalSttConfig, SpeechConfig, SpeechProvider};
pub use error::SpeechError;
pub use ports::{SpeechToText, TextToSpeech};
pub use providers::{OpenAISpeechProvider, WhisperCppProvider};
pub use types::{AudioData, AudioFormat, Transcription};
