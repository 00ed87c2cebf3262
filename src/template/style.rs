//! Styled template output: the inverse of [`detemplatize`](super::detemplatize).

use image::RgbaImage;
use url::{Url, form_urlencoded};

use crate::core::IndexedImage;

/// Block size used when styling templates for sharing.
pub const DEFAULT_BLOCK: u32 = 3;

/// Upscale `image` by `block`, drawing each pixel as a single dot centred in an
/// otherwise transparent block. Odd block sizes centre exactly.
pub fn style_dotted(image: &RgbaImage, block: u32) -> RgbaImage {
    let block = block.max(1);
    let centre = block / 2;
    let mut out = RgbaImage::new(image.width() * block, image.height() * block);
    for (x, y, px) in image.enumerate_pixels() {
        out.put_pixel(x * block + centre, y * block + centre, *px);
    }
    out
}

/// Build a template link for `template` whose styled image is hosted at `styled_url`.
///
/// The view is centred on the template.
pub fn template_link(base: &Url, template: &IndexedImage, styled_url: &str) -> String {
    let centre_x = i64::from(template.width() / 2) + i64::from(template.ox());
    let centre_y = i64::from(template.height() / 2) + i64::from(template.oy());
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("x", &centre_x.to_string())
        .append_pair("y", &centre_y.to_string())
        .append_pair("ox", &template.ox().to_string())
        .append_pair("oy", &template.oy().to_string())
        .append_pair("oo", "1")
        .append_pair("template", styled_url)
        .append_pair("tw", &template.width().to_string())
        .finish();

    let mut link = base.clone();
    link.set_fragment(Some(&query));
    link.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::link::TemplateLink;
    use image::Rgba;

    #[test]
    fn test_style_dotted_places_centre_dot() {
        let img = RgbaImage::from_pixel(2, 1, Rgba([9, 8, 7, 255]));
        let styled = style_dotted(&img, 3);
        assert_eq!(styled.dimensions(), (6, 3));
        assert_eq!(styled.get_pixel(1, 1).0, [9, 8, 7, 255]);
        assert_eq!(styled.get_pixel(4, 1).0, [9, 8, 7, 255]);
        assert_eq!(styled.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(styled.pixels().filter(|p| p.0[3] > 0).count(), 2);
    }

    #[test]
    fn test_template_link_parses_back() {
        let base = Url::parse("https://pxls.space/").unwrap();
        let template = IndexedImage::transparent(20, 10).with_origin(100, 50);
        let link = template_link(&base, &template, "https://i.example.com/a b.png");

        assert!(link.starts_with("https://pxls.space/#x=110&y=55&"));
        let parsed = TemplateLink::parse(&link).unwrap();
        assert_eq!(parsed.image_url, "https://i.example.com/a b.png");
        assert_eq!(parsed.true_width, 20);
        assert_eq!((parsed.ox, parsed.oy), (100, 50));
    }
}
