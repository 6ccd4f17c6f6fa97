//! Speech processing provider implementations
//!
//! Contains concrete implementations of the `SpeechToText` and `TextToSpeech` traits.

pub mod openai;
pub mod whisper_cpp;

pub use openai::OpenAISpeechProvider;
pub use whisper_cpp::WhisperCppProvider;
