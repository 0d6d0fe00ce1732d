//! OS signal handling.
//!
//! First Ctrl-C cancels in-flight calls at their next suspension point; a
//! second one exits immediately.

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Exit status used for a forced exit after a repeated interrupt.
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawn a task translating Ctrl-C into `shutdown.trigger()`.
pub fn spawn_interrupt_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        tracing::warn!("Interrupt received, cancelling pending calls");
        shutdown.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Second interrupt, exiting");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}
