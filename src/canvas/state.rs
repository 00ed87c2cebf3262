//! Authoritative in-memory copy of the shared canvas.
//!
//! Writers are the delta feed (`apply_*`) and the refresher (`replace`). Both go
//! through a single `RwLock`; the feed additionally passes the [`PauseGate`] so a
//! refresh can hold delta application off for its whole fetch-and-replace window.
//!
//! Readers take a [`CanvasSnapshot`], which is two `Arc` clones. The next write
//! copies the board if a snapshot is still alive (`Arc::make_mut`), so readers
//! never see a half-applied batch and never hold the lock while working.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

use super::gate::{PauseGate, PauseGuard};
use super::info::CanvasInfo;
use crate::core::IndexedImage;
use crate::error::{Result, TrackerError};

/// A single pixel change from the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PixelDelta {
    pub x: u32,
    pub y: u32,
    pub color: u8,
}

impl PixelDelta {
    pub const fn new(x: u32, y: u32, color: u8) -> Self {
        Self { x, y, color }
    }
}

/// Consistent read-only view of the canvas at one point in time.
#[derive(Debug, Clone)]
pub struct CanvasSnapshot {
    pub info: Arc<CanvasInfo>,
    pub board: Arc<IndexedImage>,
}

struct Live {
    info: Arc<CanvasInfo>,
    board: Arc<IndexedImage>,
}

/// Shared canvas state. Created empty, populated by the first full fetch.
#[derive(Default)]
pub struct CanvasState {
    live: RwLock<Option<Live>>,
    gate: PauseGate,
}

impl CanvasState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the first board.
    pub fn initialize(&self, info: CanvasInfo, board: IndexedImage) -> Result<()> {
        self.install(info, board)?;
        crate::debug!("canvas"; "initialized");
        Ok(())
    }

    /// Replace info and board wholesale.
    ///
    /// Does not pass the gate: the refresher calls this while holding
    /// [`CanvasState::pause`].
    pub fn replace(&self, info: CanvasInfo, board: IndexedImage) -> Result<()> {
        self.install(info, board)
    }

    fn install(&self, info: CanvasInfo, board: IndexedImage) -> Result<()> {
        if board.width() != info.width || board.height() != info.height {
            return Err(TrackerError::state(format!(
                "board is {}x{} but canvas info says {}x{}",
                board.width(),
                board.height(),
                info.width,
                info.height
            )));
        }
        *self.live.write() = Some(Live {
            info: Arc::new(info),
            board: Arc::new(board.with_origin(0, 0)),
        });
        Ok(())
    }

    /// Apply one delta. See [`CanvasState::apply_batch`].
    #[cfg(test)]
    pub fn apply_delta(&self, delta: PixelDelta) -> bool {
        self.apply_batch(std::slice::from_ref(&delta)) == 1
    }

    /// Apply deltas in order and return how many landed.
    ///
    /// Blocks while a refresh holds the pause gate. Deltas outside the board,
    /// with a color the palette doesn't define, or arriving before the first
    /// fetch are logged and skipped; the board is left untouched for them.
    pub fn apply_batch(&self, deltas: &[PixelDelta]) -> usize {
        let _pass = self.gate.enter();
        let mut live = self.live.write();
        let Some(live) = live.as_mut() else {
            crate::debug!("canvas"; "dropping {} delta(s) before first fetch", deltas.len());
            return 0;
        };

        let info = Arc::clone(&live.info);
        let board = Arc::make_mut(&mut live.board);
        let mut applied = 0;
        for delta in deltas {
            if !info.contains(delta.x, delta.y) {
                crate::log!("canvas"; "ignoring out of bounds pixel ({}, {})", delta.x, delta.y);
                continue;
            }
            if !info.palette.is_valid_index(delta.color) {
                crate::log!("canvas"; "ignoring unknown color {} at ({}, {})", delta.color, delta.x, delta.y);
                continue;
            }
            board.set(delta.x, delta.y, delta.color);
            applied += 1;
        }
        applied
    }

    /// Suspend delta application until the guard drops.
    pub fn pause(&self) -> PauseGuard<'_> {
        self.gate.pause()
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    #[cfg(test)]
    pub fn is_initialized(&self) -> bool {
        self.live.read().is_some()
    }

    /// Current info and board, or `None` before the first fetch.
    pub fn snapshot(&self) -> Option<CanvasSnapshot> {
        self.live.read().as_ref().map(|live| CanvasSnapshot {
            info: Arc::clone(&live.info),
            board: Arc::clone(&live.board),
        })
    }

    pub fn info(&self) -> Option<Arc<CanvasInfo>> {
        self.live.read().as_ref().map(|live| Arc::clone(&live.info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Palette, TRANSPARENT};
    use std::thread;
    use std::time::Duration;

    fn info(width: u32, height: u32, code: &str) -> CanvasInfo {
        CanvasInfo {
            width,
            height,
            palette: Palette::from_hex(["FF0000", "00FF00"]).unwrap(),
            code: code.into(),
        }
    }

    fn state_3x3() -> CanvasState {
        let state = CanvasState::new();
        state
            .initialize(info(3, 3, "a"), IndexedImage::filled(3, 3, 0))
            .unwrap();
        state
    }

    #[test]
    fn test_apply_delta_reads_back() {
        let state = state_3x3();
        assert!(state.apply_delta(PixelDelta::new(2, 1, 1)));
        assert!(state.apply_delta(PixelDelta::new(0, 0, TRANSPARENT)));
        let snap = state.snapshot().unwrap();
        assert_eq!(snap.board.get(2, 1), Some(1));
        assert_eq!(snap.board.get(0, 0), Some(TRANSPARENT));
    }

    #[test]
    fn test_out_of_bounds_delta_leaves_board_unchanged() {
        let state = state_3x3();
        let before = state.snapshot().unwrap().board;
        assert!(!state.apply_delta(PixelDelta::new(3, 0, 1)));
        assert!(!state.apply_delta(PixelDelta::new(0, 9, 1)));
        assert!(!state.apply_delta(PixelDelta::new(0, 0, 7)));
        assert_eq!(*state.snapshot().unwrap().board, *before);
    }

    #[test]
    fn test_delta_before_initialize_is_dropped() {
        let state = CanvasState::new();
        assert!(!state.apply_delta(PixelDelta::new(0, 0, 0)));
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn test_batch_applies_in_order() {
        let state = state_3x3();
        let applied = state.apply_batch(&[
            PixelDelta::new(1, 1, 1),
            PixelDelta::new(5, 5, 1),
            PixelDelta::new(1, 1, 0),
        ]);
        assert_eq!(applied, 2);
        assert_eq!(state.snapshot().unwrap().board.get(1, 1), Some(0));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let state = state_3x3();
        let snap = state.snapshot().unwrap();
        state.apply_delta(PixelDelta::new(0, 0, 1));
        assert_eq!(snap.board.get(0, 0), Some(0));
        assert_eq!(state.snapshot().unwrap().board.get(0, 0), Some(1));
    }

    #[test]
    fn test_replace_rejects_mismatched_board() {
        let state = state_3x3();
        let err = state
            .replace(info(4, 4, "b"), IndexedImage::filled(3, 3, 0))
            .unwrap_err();
        assert!(matches!(err, TrackerError::State(_)));
        assert_eq!(state.info().unwrap().code, "a");
    }

    #[test]
    fn test_replace_swaps_info_and_board() {
        let state = state_3x3();
        state
            .replace(info(2, 1, "b"), IndexedImage::filled(2, 1, 1))
            .unwrap();
        let snap = state.snapshot().unwrap();
        assert_eq!(snap.info.code, "b");
        assert_eq!(snap.board.pixels(), &[1, 1]);
        // Old coordinates that no longer exist are rejected after a resize.
        assert!(!state.apply_delta(PixelDelta::new(2, 2, 0)));
    }

    #[test]
    fn test_deltas_during_pause_apply_after_replacement() {
        let state = std::sync::Arc::new(state_3x3());

        let guard = state.pause();
        let feeder = {
            let state = std::sync::Arc::clone(&state);
            thread::spawn(move || state.apply_delta(PixelDelta::new(1, 1, 1)))
        };

        thread::sleep(Duration::from_millis(50));
        // The queued delta has not touched the old board.
        assert_eq!(state.snapshot().unwrap().board.get(1, 1), Some(0));

        state
            .replace(info(3, 3, "a"), IndexedImage::transparent(3, 3))
            .unwrap();
        drop(guard);

        assert!(feeder.join().unwrap());
        let board = state.snapshot().unwrap().board;
        assert_eq!(board.get(1, 1), Some(1));
        assert_eq!(board.opaque_count(), 1);
    }
}
