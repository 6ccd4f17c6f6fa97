//! Application state shared across handlers

use std::sync::Arc;

use application::TurnPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline driving every conversational turn
    pub pipeline: Arc<TurnPipeline>,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create state around a pipeline
    pub fn new(pipeline: Arc<TurnPipeline>, max_upload_bytes: usize) -> Self {
        Self {
            pipeline,
            max_upload_bytes,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}
