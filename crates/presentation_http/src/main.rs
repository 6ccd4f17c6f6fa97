//! LingoTutor HTTP Server
//!
//! Main entry point for the tutor API server.

use std::{future::IntoFuture, sync::Arc, time::Duration};

use anyhow::Context;
use application::{TurnPipeline, TurnPipelineConfig};
use infrastructure::{
    AppConfig, DialogueAdapter, LocalMediaStore, SynthesisAdapter, TelemetryConfig,
    TranscriptionAdapter, init_telemetry,
};
use presentation_http::{
    AppState, cors_layer, create_router, set_expose_internal_errors, spawn_artifact_sweep_task,
};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_telemetry(&TelemetryConfig::with_format(config.server.log_format))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "LingoTutor starting"
    );

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    set_expose_internal_errors(!config.is_production());

    info!(
        bind = %config.server.bind_address(),
        model = %config.inference.default_model,
        stt_provider = ?config.speech.stt_provider,
        media_dir = %config.media.directory.display(),
        "Configuration loaded"
    );

    // Adapters are built once and shared by every request
    let transcriber = Arc::new(TranscriptionAdapter::new(&config.speech)?);
    let dialogue = Arc::new(DialogueAdapter::new(config.inference.clone())?);
    let synthesizer = Arc::new(SynthesisAdapter::new(&config.speech)?);
    let media = Arc::new(LocalMediaStore::open(&config.media)?);

    let pipeline = Arc::new(TurnPipeline::with_config(
        transcriber,
        dialogue,
        synthesizer,
        media,
        TurnPipelineConfig {
            history_window: config.dialogue.history_window(),
            reclaim_on_fetch: config.media.reclaim_on_fetch,
        },
    ));

    let sweep = spawn_artifact_sweep_task(
        Arc::clone(&pipeline),
        Duration::from_secs(config.media.sweep_interval_secs),
    );

    let state = AppState::new(pipeline, config.server.max_upload_bytes);
    let app = create_router(state).layer(cors_layer(&config.server.allowed_origins));

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server listening on http://{}", addr);

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });

    tokio::select! {
        result = server.into_future() => result?,
        () = drain_deadline(signalled_rx, grace) => {
            warn!(grace_secs = grace.as_secs(), "Connections still open after grace period");
        }
    }

    sweep.abort();
    info!("Server shutdown complete");

    Ok(())
}

/// Resolve `grace` after the shutdown signal fired
async fn drain_deadline(signalled: tokio::sync::oneshot::Receiver<()>, grace: Duration) {
    if signalled.await.is_ok() {
        info!("Waiting up to {:?} for connections to close", grace);
        tokio::time::sleep(grace).await;
    } else {
        std::future::pending::<()>().await;
    }
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
