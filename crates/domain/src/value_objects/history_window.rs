//! Bounding of caller-supplied conversation history

use serde::{Deserialize, Serialize};

use crate::entities::ChatMessage;

/// Limits applied to history before a prompt is built
///
/// Only the most recent entries that fit both limits are kept. A limit of
/// zero disables that limit; the default window disables both, leaving
/// history exactly as the caller sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    /// Maximum number of history entries
    pub max_messages: usize,
    /// Maximum total characters across kept entries
    pub max_chars: usize,
}

impl HistoryWindow {
    /// Create a window with the given limits
    pub const fn new(max_messages: usize, max_chars: usize) -> Self {
        Self {
            max_messages,
            max_chars,
        }
    }

    /// A window that keeps everything
    pub const fn unbounded() -> Self {
        Self::new(0, 0)
    }

    /// Whether both limits are disabled
    pub const fn is_unbounded(&self) -> bool {
        self.max_messages == 0 && self.max_chars == 0
    }

    /// Keep the longest suffix of `history` that fits the window
    ///
    /// Entries are dropped from the oldest end only; the order of kept
    /// entries is unchanged.
    pub fn apply(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        history[self.start_index(history)..].to_vec()
    }

    /// Index of the first entry that survives the window
    pub fn start_index(&self, history: &[ChatMessage]) -> usize {
        let mut start = history.len();
        let mut chars = 0usize;

        for (idx, msg) in history.iter().enumerate().rev() {
            let kept = history.len() - idx;
            if self.max_messages > 0 && kept > self.max_messages {
                break;
            }
            chars += msg.char_len();
            if self.max_chars > 0 && chars > self.max_chars {
                break;
            }
            start = idx;
        }

        start
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::unbounded()
    }
}
