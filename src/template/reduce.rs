//! Quantize RGBA images onto the canvas palette.

use image::RgbaImage;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::core::{IndexedImage, Palette, Rgba};

/// Rows handed to one rayon task.
const ROWS_PER_TASK: usize = 16;

/// Map every pixel to the index of its nearest palette color.
///
/// Distance is euclidean over RGBA. A synthetic fully transparent entry is
/// tested after the real colors and maps to the sentinel; ties keep the entry
/// tested first (see [`Palette::nearest`]). Only the output grid is allocated,
/// plus a per-task cache of colors already resolved.
pub fn reduce(image: &RgbaImage, palette: &Palette) -> IndexedImage {
    let (width, height) = image.dimensions();
    let mut pixels = vec![0u8; width as usize * height as usize];
    if pixels.is_empty() {
        return IndexedImage::transparent(width, height);
    }

    let row_len = width as usize;
    let raw = image.as_raw();
    pixels
        .par_chunks_mut(row_len * ROWS_PER_TASK)
        .zip(raw.par_chunks(row_len * 4 * ROWS_PER_TASK))
        .for_each(|(out, src)| {
            let mut cache: FxHashMap<[u8; 4], u8> = FxHashMap::default();
            for (dst, px) in out.iter_mut().zip(src.chunks_exact(4)) {
                let key = [px[0], px[1], px[2], px[3]];
                *dst = *cache
                    .entry(key)
                    .or_insert_with(|| palette.nearest(Rgba(key)));
            }
        });

    IndexedImage::from_raw(width, height, pixels)
}
