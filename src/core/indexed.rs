//! Palette-indexed pixel grid placed on the canvas coordinate space.

use crate::core::palette::TRANSPARENT;
use crate::error::{Result, TrackerError};

/// A row-major grid of palette indices with an origin offset in canvas coordinates.
///
/// The board is an `IndexedImage` at origin `(0, 0)` covering the whole canvas;
/// templates are smaller images placed at their `(ox, oy)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    ox: i32,
    oy: i32,
    pixels: Vec<u8>,
}

impl IndexedImage {
    /// Wrap `pixels` as a `width` x `height` grid at origin `(0, 0)`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TrackerError::state(format!(
                "{width}x{height} grid needs {expected} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            ox: 0,
            oy: 0,
            pixels,
        })
    }

    /// Wrap a buffer whose length is known to be `width * height`.
    pub(crate) fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            ox: 0,
            oy: 0,
            pixels,
        }
    }

    /// A grid where every pixel is `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            ox: 0,
            oy: 0,
            pixels: vec![value; width as usize * height as usize],
        }
    }

    /// A fully transparent grid.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn with_origin(mut self, ox: i32, oy: i32) -> Self {
        self.ox = ox;
        self.oy = oy;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ox(&self) -> i32 {
        self.ox
    }

    pub fn oy(&self) -> i32 {
        self.oy
    }

    /// Zero-area images carry no pixels; a template cropped away entirely ends up here.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact(0) panics; an empty grid has no rows anyway.
        self.pixels.chunks_exact(self.width.max(1) as usize)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Pixel at local coordinates.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at local coordinates; returns `false` when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: u8) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the `width` x `height` region starting at local `(x, y)`.
    ///
    /// The region is clipped to this image. The copy's origin is the region's
    /// position in canvas coordinates.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x0 = x.min(self.width);
        let y0 = y.min(self.height);
        let x1 = x.saturating_add(width).min(self.width);
        let y1 = y.saturating_add(height).min(self.height);
        let (w, h) = (x1 - x0, y1 - y0);

        let mut pixels = Vec::with_capacity(w as usize * h as usize);
        for row in y0..y1 {
            let start = row as usize * self.width as usize + x0 as usize;
            pixels.extend_from_slice(&self.pixels[start..start + w as usize]);
        }
        Self {
            width: w,
            height: h,
            ox: self.ox + x0 as i32,
            oy: self.oy + y0 as i32,
            pixels,
        }
    }

    /// Number of pixels that are not the transparent sentinel.
    #[cfg(test)]
    pub fn opaque_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != TRANSPARENT).count()
    }
}
