//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers shutdown when Ctrl+C arrives.
pub fn spawn_signal_handler(shutdown: Shutdown) {
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            return;
        }
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    });
}
