//! Turn indexed grids back into RGBA pictures.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, Rgba as Pixel, RgbaImage};

use super::indexed::IndexedImage;
use super::palette::{Palette, Rgba};

/// Colors used for progress overlays: wrong, correct, painted-outside-template.
pub const OVERLAY_COLORS: [Rgba; 3] = [
    Rgba([255, 0, 0, 255]),
    Rgba([0, 255, 0, 255]),
    Rgba([70, 70, 70, 100]),
];

/// Render `image` with `palette`.
///
/// The sentinel and indices the palette doesn't define render fully transparent.
pub fn render(image: &IndexedImage, palette: &[Rgba]) -> RgbaImage {
    let mut out = RgbaImage::new(image.width(), image.height());
    for (dst, &index) in out.pixels_mut().zip(image.pixels()) {
        let color = palette.get(usize::from(index)).copied().unwrap_or(Rgba::CLEAR);
        *dst = Pixel(color.0);
    }
    out
}

/// Render a board or template with the canvas palette.
pub fn render_with(image: &IndexedImage, palette: &Palette) -> RgbaImage {
    render(image, palette.colors())
}

/// Render a progress overlay with [`OVERLAY_COLORS`].
pub fn render_overlay(overlay: &IndexedImage) -> RgbaImage {
    render(overlay, &OVERLAY_COLORS)
}

/// Encode as PNG in memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .context("failed to encode png")?;
    Ok(buf.into_inner())
}

/// Write as a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, encode_png(image)?)
        .with_context(|| format!("failed to write `{}`", path.display()))
}
