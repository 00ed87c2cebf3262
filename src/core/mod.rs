//! Pixel primitives shared by the board and templates.
//!
//! - [`palette`]: canvas colors and the transparent sentinel
//! - [`indexed`]: palette-indexed grids placed on the canvas
//! - [`render`]: indexed grids back to RGBA / PNG

pub mod indexed;
pub mod palette;
pub mod render;

pub use indexed::IndexedImage;
pub use palette::{Palette, Rgba, TRANSPARENT};
