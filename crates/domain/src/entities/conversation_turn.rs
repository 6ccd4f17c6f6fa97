//! One dialogue request: the learner's message plus the history they resent

use crate::{
    entities::ChatMessage,
    errors::DomainError,
    value_objects::{HistoryWindow, TutorPersona},
};

/// A single conversational turn awaiting a tutor reply
///
/// Created per request and dropped once the reply has been produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    user_message: String,
    history: Vec<ChatMessage>,
    persona: TutorPersona,
}

impl ConversationTurn {
    /// Create a turn with the default tutor persona
    ///
    /// Fails when the user message is empty or whitespace only.
    pub fn new(
        user_message: impl Into<String>,
        history: Vec<ChatMessage>,
    ) -> Result<Self, DomainError> {
        let user_message = user_message.into();
        if user_message.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "message must not be empty".to_string(),
            ));
        }

        Ok(Self {
            user_message,
            history,
            persona: TutorPersona::english_tutor(),
        })
    }

    /// Bound the history with the given window
    #[must_use]
    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        let start = window.start_index(&self.history);
        self.history.drain(..start);
        self
    }

    /// The learner's new message
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// History as supplied by the caller (after windowing)
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The persona used for this turn
    pub const fn persona(&self) -> TutorPersona {
        self.persona
    }

    /// Build the prompt: persona, then history in order, then the new message
    pub fn prompt(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(self.persona.as_message());
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(self.user_message.clone()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MessageRole;

    #[test]
    fn empty_message_is_rejected() {
        assert!(ConversationTurn::new("", vec![]).is_err());
        assert!(ConversationTurn::new("  \n", vec![]).is_err());
    }

    #[test]
    fn prompt_starts_with_persona() {
        let turn = ConversationTurn::new("Hello", vec![]).unwrap();
        let prompt = turn.prompt();
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].role, MessageRole::System);
        assert_eq!(prompt[0].content, TutorPersona::english_tutor().text());
        assert_eq!(prompt[1], ChatMessage::user("Hello"));
    }

    #[test]
    fn prompt_preserves_history_order() {
        let history = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("second"),
            ChatMessage::user("third"),
        ];
        let turn = ConversationTurn::new("fourth", history.clone()).unwrap();
        let prompt = turn.prompt();
        assert_eq!(&prompt[1..4], history.as_slice());
        assert_eq!(prompt[4], ChatMessage::user("fourth"));
    }

    #[test]
    fn window_drops_oldest_entries() {
        let history = vec![
            ChatMessage::user("one"),
            ChatMessage::assistant("two"),
            ChatMessage::user("three"),
        ];
        let turn = ConversationTurn::new("four", history)
            .unwrap()
            .with_window(HistoryWindow::new(2, 0));
        assert_eq!(
            turn.history(),
            &[ChatMessage::assistant("two"), ChatMessage::user("three")]
        );
    }

    #[test]
    fn message_is_kept_verbatim() {
        let turn = ConversationTurn::new("  How are you?  ", vec![]).unwrap();
        assert_eq!(turn.user_message(), "  How are you?  ");
    }
}
