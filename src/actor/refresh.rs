//! Refresher - Periodic Full Canvas Reload
//!
//! Every tick re-fetches canvas info and the whole board and swaps them into
//! the [`CanvasState`]. Delta application is paused between the info fetch and
//! the swap; the pause guard lives on the stack, so every exit path resumes the
//! feed.
//!
//! A failed tick is logged and retried on the next one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::canvas::{CanvasSource, CanvasState};
use crate::error::Result;

/// Result of one successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refreshed {
    pub code: String,
    /// The canvas generation code changed (the canvas was reset)
    pub reset: bool,
}

pub struct Refresher<S> {
    source: S,
    state: Arc<CanvasState>,
    interval: Duration,
}

impl<S: CanvasSource> Refresher<S> {
    pub fn new(source: S, state: Arc<CanvasState>, interval: Duration) -> Self {
        Self {
            source,
            state,
            interval,
        }
    }

    /// Fetch info and board once and install them.
    pub async fn refresh_once(&self) -> Result<Refreshed> {
        let info = self.source.fetch_info().await?;
        let previous = self.state.info().map(|info| info.code.clone());

        // Waits for at most the batch being applied; batches do no I/O.
        let _paused = self.state.pause();
        let board = self.source.fetch_board(&info).await?;
        let code = info.code.clone();
        self.state.replace(info, board)?;

        let reset = previous.is_some_and(|previous| previous != code);
        Ok(Refreshed { code, reset })
    }

    /// Refresh every interval until `shutdown` flips or its sender goes away.
    ///
    /// The first tick fires one interval from now; the initial fetch is the
    /// caller's job.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        crate::debug!("refresh"; "stopped");
    }

    async fn tick(&self) {
        let started = std::time::Instant::now();
        match self.refresh_once().await {
            Ok(Refreshed { code, reset: true }) => {
                crate::log!("refresh"; "canvas reset detected, now on canvas {}", code);
            }
            Ok(_) => {
                crate::debug!("refresh"; "board replaced in {:?}", started.elapsed());
            }
            Err(e) if e.is_retryable() => {
                crate::log!("refresh"; "refresh failed, retrying next tick: {}", e);
            }
            Err(e) => crate::log!("error"; "refresh failed: {}", e),
        }
    }
}
