//! Domain entities - Objects with identity and lifecycle

mod audio_artifact;
mod chat_message;
mod conversation_turn;
mod turn_state;

pub use audio_artifact::AudioArtifact;
pub use chat_message::{ChatMessage, MessageRole};
pub use conversation_turn::ConversationTurn;
pub use turn_state::{TurnState, TurnTracker};
