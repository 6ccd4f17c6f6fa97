//! LingoTutor HTTP presentation layer
//!
//! Speech and chat endpoints on top of the turn pipeline.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tasks;

pub use error::{ApiError, ErrorResponse, set_expose_internal_errors};
pub use middleware::{RequestId, RequestIdLayer, ValidatedJson};
pub use routes::{cors_layer, create_router};
pub use state::AppState;
pub use tasks::spawn_artifact_sweep_task;
