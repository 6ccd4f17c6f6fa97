//! Value Objects - Immutable, identity-less domain primitives

mod artifact_id;
mod audio_format;
mod history_window;
mod persona;

pub use artifact_id::ArtifactId;
pub use audio_format::AudioFormat;
pub use history_window::HistoryWindow;
pub use persona::TutorPersona;
