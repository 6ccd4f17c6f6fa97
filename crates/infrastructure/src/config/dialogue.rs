//! Tutor dialogue configuration.

use domain::HistoryWindow;
use serde::{Deserialize, Serialize};

/// Optional bounds on the history a client resends with each turn
///
/// A limit of 0 disables it. Both are 0 by default: the client owns its
/// history and it reaches the prompt unmodified unless a limit is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Most recent history entries kept
    #[serde(default)]
    pub max_history_messages: usize,

    /// Total characters of history content kept
    #[serde(default)]
    pub max_history_chars: usize,
}

impl DialogueConfig {
    /// History window for the turn pipeline
    pub const fn history_window(&self) -> HistoryWindow {
        HistoryWindow::new(self.max_history_messages, self.max_history_chars)
    }
}
