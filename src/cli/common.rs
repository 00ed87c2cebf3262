//! Common utilities shared across CLI commands.

use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::RgbaImage;

use crate::canvas::{CanvasClient, CanvasSnapshot, CanvasState};
use crate::config::TrackerConfig;
use crate::core::render::save_png;
use crate::template::extract::decode_image;
use crate::template::looks_like_template_link;

/// Run `future` to completion on a fresh multi-threaded runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    Ok(rt.block_on(future))
}

/// HTTP client for the configured canvas.
pub fn connect(config: &TrackerConfig) -> Result<CanvasClient> {
    let base = config
        .canvas
        .base_url()
        .with_context(|| format!("invalid canvas url `{}`", config.canvas.url))?;
    Ok(CanvasClient::new(base, config.canvas.timeout())?)
}

/// Fetch canvas info and the full board once.
pub async fn fetch_snapshot(client: &CanvasClient) -> Result<CanvasSnapshot> {
    let info = client.info().await.context("failed to fetch canvas info")?;
    let board = client.board(&info).await.context("failed to fetch board")?;
    let state = CanvasState::new();
    state.initialize(info, board)?;
    state
        .snapshot()
        .context("canvas state is empty after initialization")
}

/// Resolve a template reference: either a link, or the name of a configured
/// `[[template]]` entry.
pub fn resolve_link(config: &TrackerConfig, reference: &str) -> Result<String> {
    if looks_like_template_link(reference) {
        return Ok(reference.to_owned());
    }
    match config.templates.iter().find(|t| t.name == reference) {
        Some(entry) => Ok(entry.url.clone()),
        None => bail!("`{reference}` is neither a template link nor a configured template"),
    }
}

/// Read an image from a local path or an http(s) URL.
pub async fn load_image(client: &CanvasClient, source: &str) -> Result<RgbaImage> {
    let bytes = if source.starts_with("http://") || source.starts_with("https://") {
        client.download(source).await?
    } else {
        std::fs::read(source).with_context(|| format!("failed to read {source}"))?
    };
    Ok(decode_image(&bytes)?)
}

/// Save an image and report where it went.
pub fn write_image(image: &RgbaImage, path: &Path) -> Result<()> {
    save_png(image, path)?;
    crate::log!("saved"; "{} ({}x{})", path.display(), image.width(), image.height());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    const LINK: &str = "https://pxls.space/#x=1&y=1&ox=0&oy=0&tw=2&template=https%3A%2F%2Fi.example%2Fa.png";

    #[test]
    fn test_resolve_link_passes_links_through() {
        let config = TrackerConfig::default();
        assert_eq!(resolve_link(&config, LINK).unwrap(), LINK);
    }

    #[test]
    fn test_resolve_link_by_name() {
        let config = test_parse_config(&format!("[[template]]\nname = \"logo\"\nurl = \"{LINK}\"\n"));
        assert_eq!(resolve_link(&config, "logo").unwrap(), LINK);
        assert!(resolve_link(&config, "missing").is_err());
    }

    #[tokio::test]
    async fn test_load_image_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        RgbaImage::from_pixel(2, 3, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let client = CanvasClient::new(
            url::Url::parse("http://localhost/").unwrap(),
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        let image = load_image(&client, path.to_str().unwrap()).await.unwrap();
        assert_eq!(image.dimensions(), (2, 3));
    }
}
