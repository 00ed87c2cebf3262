//! Ctrl+C handling.
//!
//! - Before `register_shutdown()`: the process exits immediately
//! - After: the signal is forwarded to the registered receiver once, and the
//!   running components shut down gracefully

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{self, Receiver, Sender};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the running tracker
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        let repeated = SHUTDOWN.swap(true, Ordering::SeqCst);
        match SHUTDOWN_TX.get() {
            Some(tx) if !repeated => {
                crate::log!("tracker"; "shutting down...");
                let _ = tx.send(());
            }
            // Nothing to wind down, or a second Ctrl+C while stopping.
            _ => std::process::exit(130),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Route Ctrl+C to the returned receiver instead of exiting.
///
/// Only the first registration takes effect.
pub fn register_shutdown() -> Receiver<()> {
    let (tx, rx) = channel::bounded(1);
    let _ = SHUTDOWN_TX.set(tx);
    rx
}
