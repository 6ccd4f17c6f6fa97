//! The fixed tutoring persona prepended to every dialogue request

use crate::entities::ChatMessage;

const ENGLISH_TUTOR: &str = "You are an English learning assistant with a focus on personalized \
language acquisition. Your role is to provide clear, accurate, and contextually appropriate \
responses tailored to the learner's proficiency level (beginner, intermediate, advanced). Your \
guidance should cover the following areas: Grammar: You explain English grammar rules and provide \
practical examples. Pronunciation: You offer feedback and suggestions to improve pronunciation, \
focusing on common challenges for non-native speakers. Vocabulary: You suggest vocabulary based on \
the user's interests, context, and desired learning goals. Listening and Comprehension: You help \
improve listening skills through tailored exercises or recommendations. Conversational Skills: You \
engage in realistic dialogues, allowing the learner to practice everyday English in different \
contexts. Writing Skills: You provide writing corrections and offer constructive feedback on \
sentence structure, style, and vocabulary usage. Cultural Context: You explain idiomatic \
expressions, slang, and cultural references to help the learner understand the nuances of the \
language. Adaptability: You adjust your difficulty level based on the learner's progress, giving \
progressively more complex sentences and challenges. You must only respond in English, and only in \
English. If the user communicates in another language, politely ask them to continue in English. \
Additionally, suggest a relevant topic of discussion based on the current context to encourage \
further conversation in English.";

/// System instruction shared by every turn of every conversation
///
/// The text is a process-wide constant. There is no per-learner variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorPersona {
    text: &'static str,
}

impl TutorPersona {
    /// The English tutor persona
    #[must_use]
    pub const fn english_tutor() -> Self {
        Self { text: ENGLISH_TUTOR }
    }

    /// Raw instruction text
    #[must_use]
    pub const fn text(&self) -> &'static str {
        self.text
    }

    /// The persona as the leading system message of a prompt
    pub fn as_message(&self) -> ChatMessage {
        ChatMessage::system(self.text)
    }
}

impl Default for TutorPersona {
    fn default() -> Self {
        Self::english_tutor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::MessageRole;

    #[test]
    fn persona_is_stable() {
        assert_eq!(TutorPersona::english_tutor(), TutorPersona::default());
        assert_eq!(
            TutorPersona::english_tutor().text(),
            TutorPersona::english_tutor().text()
        );
    }

    #[test]
    fn persona_mentions_english_only_rule() {
        let text = TutorPersona::english_tutor().text();
        assert!(text.starts_with("You are an English learning assistant"));
        assert!(text.contains("You must only respond in English"));
    }

    #[test]
    fn persona_message_is_system_role() {
        let msg = TutorPersona::english_tutor().as_message();
        assert_eq!(msg.role, MessageRole::System);
        assert_eq!(msg.content, ENGLISH_TUTOR);
    }
}
