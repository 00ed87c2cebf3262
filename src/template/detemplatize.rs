//! Recover true-resolution pixels from a styled template image.
//!
//! Styled templates are integer-upscaled: every canvas pixel becomes a
//! `block x block` square that is transparent except for a dot (or a full fill)
//! in the pixel's color. Taking the per-channel maximum over each block yields
//! that color back.

use image::{Rgba, RgbaImage};

/// Reduce a styled image to `true_width` pixels across.
///
/// Passes the image through unchanged when `true_width <= 0` or the block size
/// `width / true_width` is at most 1. When the block size doesn't divide a
/// dimension, the trailing partial blocks are dropped.
pub fn detemplatize(image: RgbaImage, true_width: i64) -> RgbaImage {
    let Some(block) = block_size(image.width(), true_width) else {
        return image;
    };

    let out_width = image.width() / block;
    let out_height = image.height() / block;
    RgbaImage::from_fn(out_width, out_height, |bx, by| {
        let mut max = [0u8; 4];
        for y in by * block..(by + 1) * block {
            for x in bx * block..(bx + 1) * block {
                for (m, &c) in max.iter_mut().zip(image.get_pixel(x, y).0.iter()) {
                    *m = (*m).max(c);
                }
            }
        }
        // Anything short of fully opaque is anti-aliasing residue.
        if max[3] < u8::MAX {
            max[3] = 0;
        }
        Rgba(max)
    })
}

/// Block edge length, or `None` when there is nothing to reduce.
fn block_size(width: u32, true_width: i64) -> Option<u32> {
    if true_width <= 0 {
        return None;
    }
    let block = i64::from(width) / true_width;
    (block > 1).then_some(block as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::style::style_dotted;

    fn low_res() -> RgbaImage {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        img.put_pixel(2, 0, Rgba([10, 20, 30, 255]));
        img.put_pixel(0, 1, Rgba([0, 255, 0, 255]));
        img.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        img.put_pixel(2, 1, Rgba([0, 0, 255, 255]));
        img
    }

    #[test]
    fn test_block_size_one_is_identity() {
        let img = low_res();
        assert_eq!(detemplatize(img.clone(), 3), img);
    }

    #[test]
    fn test_non_positive_true_width_is_identity() {
        let img = low_res();
        assert_eq!(detemplatize(img.clone(), 0), img);
        assert_eq!(detemplatize(img.clone(), -4), img);
    }

    #[test]
    fn test_true_width_larger_than_image_is_identity() {
        let img = low_res();
        assert_eq!(detemplatize(img.clone(), 10), img);
    }

    #[test]
    fn test_recovers_dotted_upscale() {
        for block in [2, 3, 5] {
            let styled = style_dotted(&low_res(), block);
            assert_eq!(styled.width(), 3 * block);
            assert_eq!(detemplatize(styled, 3), low_res());
        }
    }

    #[test]
    fn test_recovers_filled_upscale() {
        let original = low_res();
        let k = 4;
        let filled = RgbaImage::from_fn(3 * k, 2 * k, |x, y| *original.get_pixel(x / k, y / k));
        assert_eq!(detemplatize(filled, 3), original);
    }

    #[test]
    fn test_partial_alpha_is_cleared() {
        let mut styled = RgbaImage::new(2, 2);
        styled.put_pixel(1, 1, Rgba([200, 100, 50, 128]));
        let out = detemplatize(styled, 1);
        assert_eq!(out.dimensions(), (1, 1));
        assert_eq!(out.get_pixel(0, 0).0, [200, 100, 50, 0]);
    }

    #[test]
    fn test_remainder_pixels_are_truncated() {
        // 7x5 with true width 3 -> block 2 -> 3x2 output.
        let styled = RgbaImage::from_pixel(7, 5, Rgba([1, 2, 3, 255]));
        let out = detemplatize(styled, 3);
        assert_eq!(out.dimensions(), (3, 2));
        assert!(out.pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }
}
