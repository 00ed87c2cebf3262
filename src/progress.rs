//! Template completion against the live board.
//!
//! A position counts only when both the template and the board hold a real
//! color there. Transparent template pixels are not part of the design and
//! transparent board pixels cannot be painted, so either excludes the position
//! from both `correct` and `total`.

use serde::{Deserialize, Serialize};

use crate::core::{IndexedImage, TRANSPARENT};

/// Overlay code: template pixel present, board holds a different color.
pub const WRONG: u8 = 0;
/// Overlay code: board matches the template.
pub const CORRECT: u8 = 1;
/// Overlay code: board holds a placed pixel where the template is transparent.
pub const OUTSIDE: u8 = 2;

/// Correct and countable pixel totals of one template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub correct: u64,
    pub total: u64,
}

impl Progress {
    pub const fn new(correct: u64, total: u64) -> Self {
        Self { correct, total }
    }

    /// Completion in percent; 0 for a template with nothing to place.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.correct as f64 / self.total as f64
        }
    }

    pub fn remaining(&self) -> u64 {
        self.total - self.correct
    }
}

/// Compare `template` with the board region under it.
pub fn compute(board: &IndexedImage, template: &IndexedImage) -> Progress {
    let mut progress = Progress::default();
    walk(board, template, |t, b| {
        if let Some(b) = b
            && t != TRANSPARENT
            && b != TRANSPARENT
        {
            progress.total += 1;
            if t == b {
                progress.correct += 1;
            }
        }
    });
    progress
}

/// [`compute`] plus a per-pixel overlay aligned with the template.
///
/// Codes are [`WRONG`], [`CORRECT`], [`OUTSIDE`] and the sentinel for excluded
/// positions.
pub fn compute_with_overlay(board: &IndexedImage, template: &IndexedImage) -> (Progress, IndexedImage) {
    let mut overlay = Vec::with_capacity(template.pixels().len());
    let mut progress = Progress::default();
    walk(board, template, |t, b| {
        let code = match (t, b) {
            (t, Some(b)) if t != TRANSPARENT && b != TRANSPARENT => {
                progress.total += 1;
                if t == b {
                    progress.correct += 1;
                    CORRECT
                } else {
                    WRONG
                }
            }
            (TRANSPARENT, Some(b)) if b != TRANSPARENT => OUTSIDE,
            _ => TRANSPARENT,
        };
        overlay.push(code);
    });

    let overlay = IndexedImage::from_raw(template.width(), template.height(), overlay)
        .with_origin(template.ox(), template.oy());
    (progress, overlay)
}

/// Visit every template position with `(template pixel, board pixel)`.
///
/// Positions that fall outside the board (a template from a larger canvas, or
/// one never cropped) see `None` for the board.
fn walk(board: &IndexedImage, template: &IndexedImage, mut visit: impl FnMut(u8, Option<u8>)) {
    let (ox, oy) = (i64::from(template.ox()), i64::from(template.oy()));
    for (ty, row) in template.rows().enumerate() {
        let by = oy + ty as i64;
        for (tx, &t) in row.iter().enumerate() {
            let bx = ox + tx as i64;
            let b = match (u32::try_from(bx), u32::try_from(by)) {
                (Ok(x), Ok(y)) => board.get(x, y),
                _ => None,
            };
            visit(t, b);
        }
    }
}
