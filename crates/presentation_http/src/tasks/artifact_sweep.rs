//! Artifact expiry sweep
//!
//! Periodically reclaims synthesized replies that were never fetched.

use std::{sync::Arc, time::Duration};

use application::TurnPipeline;
use chrono::Utc;
use tracing::{debug, error, info};

/// Spawn a background task reclaiming expired artifacts every `interval`.
///
/// The first sweep runs one interval after startup. Abort the returned
/// handle on shutdown.
pub fn spawn_artifact_sweep_task(
    pipeline: Arc<TurnPipeline>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "Starting artifact sweep task");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // Don't run immediately on startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match pipeline.sweep_expired(Utc::now()).await {
                Ok(0) => debug!("No expired artifacts"),
                Ok(removed) => debug!(removed, "Artifact sweep finished"),
                Err(e) => error!(error = %e, "Artifact sweep failed"),
            }
        }
    })
}
