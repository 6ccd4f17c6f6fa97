//! Background tasks for the HTTP presentation layer

mod artifact_sweep;

pub use artifact_sweep::spawn_artifact_sweep_task;
