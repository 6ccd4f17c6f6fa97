//! Domain layer for LingoTutor
//!
//! Contains the turn-taking vocabulary of the tutor gateway: chat messages,
//! conversation turns, audio artifacts, the turn state machine and the
//! tutoring persona. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
