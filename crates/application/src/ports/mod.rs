//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod dialogue_port;
mod media_store_port;
mod synthesis_port;
mod transcription_port;

#[cfg(test)]
pub use dialogue_port::MockDialoguePort;
pub use dialogue_port::DialoguePort;
#[cfg(test)]
pub use media_store_port::MockMediaStorePort;
pub use media_store_port::{ArtifactContent, MediaStorePort, StagedUpload};
#[cfg(test)]
pub use synthesis_port::MockSynthesisPort;
pub use synthesis_port::{SynthesisPort, SynthesizedAudio};
#[cfg(test)]
pub use transcription_port::MockTranscriptionPort;
pub use transcription_port::{TranscriptionPort, TranscriptionResult};
