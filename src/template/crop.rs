//! Clip templates to the canvas rectangle.

use crate::core::IndexedImage;

/// Clip `image`, placed at its origin, to `[0, canvas_width) x [0, canvas_height)`.
///
/// Leading rows/columns at negative coordinates are dropped and the origin moves
/// to the canvas edge; rows/columns past the far edge are truncated. The result
/// always lies inside the canvas with a non-negative origin. A template that
/// misses the canvas entirely comes back zero-area ([`IndexedImage::is_empty`]).
pub fn crop_to_canvas(image: &IndexedImage, canvas_width: u32, canvas_height: u32) -> IndexedImage {
    let (skip_x, x0) = clamp_origin(image.ox(), canvas_width);
    let (skip_y, y0) = clamp_origin(image.oy(), canvas_height);

    let width = image
        .width()
        .saturating_sub(skip_x)
        .min(canvas_width - x0);
    let height = image
        .height()
        .saturating_sub(skip_y)
        .min(canvas_height - y0);

    image
        .region(skip_x, skip_y, width, height)
        .with_origin(x0 as i32, y0 as i32)
}

/// Returns `(leading cells to drop, clipped origin)` along one axis.
fn clamp_origin(origin: i32, extent: u32) -> (u32, u32) {
    if origin < 0 {
        (origin.unsigned_abs(), 0)
    } else {
        (0, (origin as u32).min(extent))
    }
}
