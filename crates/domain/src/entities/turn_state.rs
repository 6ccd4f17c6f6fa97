//! Lifecycle of a conversational turn

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// States a turn moves through from upload to served reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Nothing received yet
    Idle,
    /// Audio uploaded and being transcribed
    Transcribing,
    /// Waiting for the tutor's reply
    AwaitingDialogue,
    /// Reply text being converted to speech
    Synthesizing,
    /// Artifact written and fetchable
    Ready,
    /// Artifact fetched by the client
    Served,
    /// Artifact reclaimed without being fetched
    Expired,
    /// A step failed
    Failed,
}

impl TurnState {
    /// Snake-case name of the state
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Transcribing => "transcribing",
            Self::AwaitingDialogue => "awaiting_dialogue",
            Self::Synthesizing => "synthesizing",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Expired => "expired",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Served | Self::Expired | Self::Failed)
    }

    /// Whether moving from `self` to `next` is allowed
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Transcribing | Self::AwaitingDialogue)
                | (Self::Transcribing, Self::AwaitingDialogue | Self::Failed)
                | (Self::AwaitingDialogue, Self::Synthesizing | Self::Failed)
                | (Self::Synthesizing, Self::Ready | Self::Failed)
                | (Self::Ready, Self::Served | Self::Expired)
        )
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one turn through [`TurnState`], rejecting illegal moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTracker {
    state: TurnState,
    visited: Vec<TurnState>,
}

impl TurnTracker {
    /// Start a turn in [`TurnState::Idle`]
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
            visited: vec![TurnState::Idle],
        }
    }

    /// Pick up a turn that an earlier request left in `state`
    pub fn resume(state: TurnState) -> Self {
        Self {
            state,
            visited: vec![state],
        }
    }

    /// Current state
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// Every state entered so far, oldest first
    pub fn visited(&self) -> &[TurnState] {
        &self.visited
    }

    /// Move to `next`
    pub fn advance(&mut self, next: TurnState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.visited.push(next);
        Ok(())
    }

    /// Mark the turn failed
    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.advance(TurnState::Failed)
    }
}

impl Default for TurnTracker {
    fn default() -> Self {
        Self::new()
    }
}
