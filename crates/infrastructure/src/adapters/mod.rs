//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod dialogue_adapter;
mod local_media_store;
mod speech_adapter;

pub use dialogue_adapter::DialogueAdapter;
pub use local_media_store::LocalMediaStore;
pub use speech_adapter::{SynthesisAdapter, TranscriptionAdapter};
