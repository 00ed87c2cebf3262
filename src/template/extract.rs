//! Template extraction: link -> styled image -> true-resolution indexed grid.
//!
//! ```text
//! parse link ─> fetch image ─> detemplatize ─> reduce ─> place at (ox, oy) ─> crop
//! ```
//!
//! Only the fetch touches the network; the remaining stages are pure and are
//! exposed through [`render_template`] for callers that already hold an image.

use image::RgbaImage;

use super::crop::crop_to_canvas;
use super::detemplatize::detemplatize;
use super::link::TemplateLink;
use super::reduce::reduce;
use crate::canvas::{CanvasInfo, ImageSource};
use crate::core::IndexedImage;
use crate::error::{Result, TrackerError};

/// Download and decode the styled image a link points at.
pub async fn fetch_styled_image<I: ImageSource>(source: &I, link: &TemplateLink) -> Result<RgbaImage> {
    let bytes = source.fetch_image(&link.image_url).await?;
    decode_image(&bytes)
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Turn a styled image into a template grid clipped to the canvas.
///
/// The result may be zero-area when the link places it off the canvas.
pub fn render_template(link: &TemplateLink, styled: RgbaImage, info: &CanvasInfo) -> IndexedImage {
    let true_size = detemplatize(styled, link.true_width);
    let placed = reduce(&true_size, &info.palette).with_origin(link.ox, link.oy);
    crop_to_canvas(&placed, info.width, info.height)
}

/// Full pipeline for a raw link string.
///
/// Decoding and quantization run on the blocking pool.
pub async fn extract<I: ImageSource>(source: &I, link: &str, info: &CanvasInfo) -> Result<IndexedImage> {
    let link = TemplateLink::parse(link)?;
    let bytes = source.fetch_image(&link.image_url).await?;
    crate::debug!("template"; "fetched {} bytes from {}", bytes.len(), link.image_url);

    let info = info.clone();
    tokio::task::spawn_blocking(move || -> Result<IndexedImage> {
        let styled = decode_image(&bytes)?;
        Ok(render_template(&link, styled, &info))
    })
    .await
    .map_err(|e| TrackerError::state(format!("template rendering failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Palette, TRANSPARENT};
    use crate::core::render::encode_png;
    use crate::template::style::style_dotted;
    use image::Rgba;

    struct FixedImage(Vec<u8>);

    impl ImageSource for FixedImage {
        async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
            assert_eq!(url, "https://i.example.com/t.png");
            Ok(self.0.clone())
        }
    }

    struct Unreachable;

    impl ImageSource for Unreachable {
        async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
            Err(TrackerError::BadStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn info() -> CanvasInfo {
        CanvasInfo {
            width: 10,
            height: 10,
            palette: Palette::from_hex(["FF0000", "00FF00"]).unwrap(),
            code: "7".into(),
        }
    }

    fn source_image() -> RgbaImage {
        RgbaImage::from_fn(3, 2, |x, y| match (x, y) {
            (1, 0) => Rgba([0, 0, 0, 0]),
            _ if (x + y) % 2 == 0 => Rgba([255, 0, 0, 255]),
            _ => Rgba([0, 255, 0, 255]),
        })
    }

    fn link(ox: i32, oy: i32) -> String {
        format!("https://pxls.space/#ox={ox}&oy={oy}&tw=3&template=https%3A%2F%2Fi.example.com%2Ft.png")
    }

    #[tokio::test]
    async fn test_extract_styled_link() {
        let styled = style_dotted(&source_image(), 3);
        let source = FixedImage(encode_png(&styled).unwrap());

        let template = extract(&source, &link(4, 5), &info()).await.unwrap();
        assert_eq!((template.ox(), template.oy()), (4, 5));
        assert_eq!((template.width(), template.height()), (3, 2));
        assert_eq!(template.pixels(), &[0, TRANSPARENT, 0, 1, 0, 1]);
    }

    #[tokio::test]
    async fn test_extract_crops_to_canvas() {
        let styled = style_dotted(&source_image(), 3);
        let source = FixedImage(encode_png(&styled).unwrap());

        let template = extract(&source, &link(-1, 9), &info()).await.unwrap();
        assert_eq!((template.ox(), template.oy()), (0, 9));
        assert_eq!((template.width(), template.height()), (2, 1));
        assert_eq!(template.pixels(), &[TRANSPARENT, 0]);
    }

    #[tokio::test]
    async fn test_extract_rejects_bad_link() {
        let err = extract(&Unreachable, "https://pxls.space/#x=1", &info())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
    }

    #[tokio::test]
    async fn test_extract_surfaces_fetch_failure() {
        let err = extract(&Unreachable, &link(0, 0), &info()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_extract_rejects_garbage_image() {
        let source = FixedImage(b"not an image".to_vec());
        let err = extract(&source, &link(0, 0), &info()).await.unwrap_err();
        assert!(matches!(err, TrackerError::Decode(_)));
    }
}
