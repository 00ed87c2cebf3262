//! Layer several templates into one combined image.

use crate::core::{IndexedImage, TRANSPARENT};
use crate::error::{Result, TrackerError};

/// Inclusive-exclusive rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Bounds {
    fn union(self, other: Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Footprint of `image` clipped to the canvas, `None` when nothing is left.
fn clipped_bounds(image: &IndexedImage, canvas_width: u32, canvas_height: u32) -> Option<Bounds> {
    let clip = |origin: i32, len: u32, extent: u32| -> Option<(u32, u32)> {
        let start = i64::from(origin).clamp(0, i64::from(extent));
        let end = (i64::from(origin) + i64::from(len)).clamp(0, i64::from(extent));
        (start < end).then_some((start as u32, end as u32))
    };
    let (x0, x1) = clip(image.ox(), image.width(), canvas_width)?;
    let (y0, y1) = clip(image.oy(), image.height(), canvas_height)?;
    Some(Bounds { x0, y0, x1, y1 })
}

/// Layer `templates` in order; later templates win where they overlap.
///
/// Only placed (non-sentinel) pixels are copied. The result covers the union of
/// the templates' footprints on the canvas and carries that rectangle's origin.
/// Zero-area templates are skipped; if every template is zero-area the result is
/// an empty image at the canvas origin. An empty `templates` is an error.
pub fn layer<'a, I>(canvas_width: u32, canvas_height: u32, templates: I) -> Result<IndexedImage>
where
    I: IntoIterator<Item = &'a IndexedImage>,
{
    let templates: Vec<&IndexedImage> = templates.into_iter().collect();
    if templates.is_empty() {
        return Err(TrackerError::validation("nothing to layer: no templates given"));
    }

    let Some(bounds) = templates
        .iter()
        .filter_map(|t| clipped_bounds(t, canvas_width, canvas_height))
        .reduce(Bounds::union)
    else {
        return Ok(IndexedImage::transparent(0, 0));
    };

    let width = bounds.x1 - bounds.x0;
    let height = bounds.y1 - bounds.y0;
    let mut combined = IndexedImage::transparent(width, height);

    for template in templates {
        let (ox, oy) = (i64::from(template.ox()), i64::from(template.oy()));
        for (ty, row) in template.rows().enumerate() {
            let y = oy + ty as i64 - i64::from(bounds.y0);
            if y < 0 || y >= i64::from(height) {
                continue;
            }
            for (tx, &pixel) in row.iter().enumerate() {
                if pixel == TRANSPARENT {
                    continue;
                }
                let x = ox + tx as i64 - i64::from(bounds.x0);
                if x < 0 || x >= i64::from(width) {
                    continue;
                }
                combined.set(x as u32, y as u32, pixel);
            }
        }
    }

    Ok(combined.with_origin(bounds.x0 as i32, bounds.y0 as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u8 = TRANSPARENT;

    #[test]
    fn test_later_template_wins_overlap() {
        let a = IndexedImage::filled(3, 3, 1);
        let b = IndexedImage::new(2, 2, vec![2, 2, T, 2]).unwrap().with_origin(1, 1);
        let combo = layer(10, 10, [&a, &b]).unwrap();

        assert_eq!((combo.ox(), combo.oy()), (0, 0));
        assert_eq!((combo.width(), combo.height()), (3, 3));
        // B's transparent pixel at (1, 2) leaves A's value in place.
        assert_eq!(combo.pixels(), &[1, 1, 1, 1, 2, 2, 1, 1, 2]);

        let reversed = layer(10, 10, [&b, &a]).unwrap();
        assert!(reversed.pixels().iter().all(|&p| p == 1));
    }

    #[test]
    fn test_disjoint_templates_are_preserved() {
        let a = IndexedImage::new(2, 1, vec![3, 4]).unwrap().with_origin(2, 5);
        let b = IndexedImage::new(1, 2, vec![7, 8]).unwrap().with_origin(6, 3);
        let combo = layer(20, 20, [&a, &b]).unwrap();

        assert_eq!((combo.ox(), combo.oy()), (2, 3));
        assert_eq!((combo.width(), combo.height()), (5, 3));
        for (img, (x, y)) in [(&a, (0, 2)), (&b, (4, 0))] {
            for (dy, row) in img.rows().enumerate() {
                for (dx, &p) in row.iter().enumerate() {
                    assert_eq!(combo.get(x + dx as u32, y + dy as u32), Some(p));
                }
            }
        }
        assert_eq!(combo.opaque_count(), 4);
    }

    #[test]
    fn test_clipped_to_canvas() {
        let a = IndexedImage::filled(4, 4, 0).with_origin(-2, 8);
        let combo = layer(10, 10, [&a]).unwrap();
        assert_eq!((combo.ox(), combo.oy()), (0, 8));
        assert_eq!((combo.width(), combo.height()), (2, 2));
        assert_eq!(combo.opaque_count(), 4);
    }

    #[test]
    fn test_degenerate_templates_are_ignored() {
        let empty = IndexedImage::transparent(0, 0).with_origin(50, 50);
        let a = IndexedImage::filled(1, 1, 5).with_origin(3, 3);
        let combo = layer(10, 10, [&empty, &a]).unwrap();
        assert_eq!((combo.ox(), combo.oy(), combo.width(), combo.height()), (3, 3, 1, 1));

        let only_empty = layer(10, 10, [&empty]).unwrap();
        assert!(only_empty.is_empty());
    }

    #[test]
    fn test_no_templates_is_an_error() {
        let err = layer(10, 10, std::iter::empty()).unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
    }
}
