//! OS signal wiring.

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers shutdown on Ctrl+C.
pub fn watch(shutdown: Shutdown) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, shutting down");
            shutdown.trigger();
        }
    });
}
