//! Template commands: `progress`, `list`, `detemplatize`, `reduce` and `layer`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;

use super::common::{block_on, connect, fetch_snapshot, load_image, resolve_link, write_image};
use crate::canvas::{CanvasSnapshot, ImageSource};
use crate::config::TrackerConfig;
use crate::core::render::{render_overlay, render_with};
use crate::progress::{self, Progress};
use crate::template::detemplatize::detemplatize;
use crate::template::extract::{extract, fetch_styled_image};
use crate::template::reduce::reduce;
use crate::template::style::{DEFAULT_BLOCK, style_dotted, template_link};
use crate::template::{
    MemoryStore, Scope, SortOrder, Template, TemplateLink, TemplateManager, Viewer,
};

// ============================================================================
// progress
// ============================================================================

/// Measure one template against the live board.
pub fn show_progress(config: &TrackerConfig, reference: &str, overlay: Option<&Path>) -> Result<()> {
    let link = resolve_link(config, reference)?;
    let client = connect(config)?;

    block_on(async {
        let snapshot = fetch_snapshot(&client).await?;
        let template = extract(&client, &link, &snapshot.info)
            .await
            .with_context(|| format!("failed to extract `{reference}`"))?;
        let (progress, grid) = progress::compute_with_overlay(&snapshot.board, &template);

        println!(
            "{} at ({}, {}), {}x{}: {}",
            reference.bold(),
            template.ox(),
            template.oy(),
            template.width(),
            template.height(),
            format_progress(&progress)
        );
        if let Some(path) = overlay {
            write_image(&render_overlay(&grid), path)?;
        }
        Ok::<_, anyhow::Error>(())
    })?
}

// ============================================================================
// list
// ============================================================================

/// Print the configured templates visible to `viewer`.
pub fn list(config: &TrackerConfig, viewer: Viewer, order: Option<SortOrder>) -> Result<()> {
    let client = connect(config)?;

    block_on(async {
        let snapshot = fetch_snapshot(&client).await?;
        let manager = TemplateManager::new(MemoryStore::new());
        for entry in &config.templates {
            if let Err(e) = manager.create(&client, entry.to_request(), &snapshot).await {
                crate::log!("error"; "template `{}`: {}", entry.name, e);
            }
        }

        let templates = manager.list_visible(&snapshot.info.code, &viewer, order)?;
        if templates.is_empty() {
            println!("no templates on canvas {}", snapshot.info.code);
        }
        for template in &templates {
            println!("{}", format_row(template));
        }
        Ok::<_, anyhow::Error>(())
    })?
}

fn format_row(template: &Template) -> String {
    let scope = match template.scope {
        Scope::Global => String::new(),
        scope => format!(" [{scope}]"),
    };
    format!(
        "{}{}: {}",
        template.name,
        scope,
        format_progress(&template.progress)
    )
}

fn format_progress(progress: &Progress) -> String {
    format!(
        "{}/{} ({:.2}%), {} left",
        progress.correct,
        progress.total,
        progress.percentage(),
        progress.remaining()
    )
}

// ============================================================================
// image tools
// ============================================================================

/// Recover the true-size image behind a template link.
pub fn detemplatize_link(config: &TrackerConfig, link: &str, output: &Path) -> Result<()> {
    let link = TemplateLink::parse(link)?;
    let client = connect(config)?;
    let styled = block_on(fetch_styled_image(&client, &link))?
        .with_context(|| format!("failed to fetch {}", link.image_url))?;
    write_image(&detemplatize(styled, link.true_width), output)
}

/// Snap an image onto the canvas palette.
pub fn reduce_image(config: &TrackerConfig, source: &str, output: &Path) -> Result<()> {
    let client = connect(config)?;
    let (image, info) = block_on(async {
        let image = load_image(&client, source).await?;
        let info = client.info().await.context("failed to fetch canvas info")?;
        Ok::<_, anyhow::Error>((image, info))
    })??;
    let reduced = reduce(&image, &info.palette);
    write_image(&render_with(&reduced, &info.palette), output)
}

/// Options of the `layer` command.
pub struct LayerOutput<'a> {
    pub output: &'a Path,
    pub styled: Option<&'a Path>,
    pub image_url: Option<&'a str>,
}

/// Combine templates bottom to top.
pub fn layer(config: &TrackerConfig, references: &[String], out: LayerOutput<'_>) -> Result<()> {
    let client = connect(config)?;

    let (combo, snapshot) = block_on(async {
        let snapshot = fetch_snapshot(&client).await?;
        let manager = TemplateManager::new(MemoryStore::new());
        let names = add_layers(&manager, &client, config, references, &snapshot).await?;
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let combo = manager.combine(&names, &snapshot)?;
        Ok::<_, anyhow::Error>((combo, snapshot))
    })??;

    let rendered = render_with(&combo, &snapshot.info.palette);
    write_image(&rendered, out.output)?;
    crate::log!("layer"; "placed at ({}, {})", combo.ox(), combo.oy());

    if let Some(path) = out.styled {
        write_image(&style_dotted(&rendered, DEFAULT_BLOCK), path)?;
        if let Some(image_url) = out.image_url {
            println!("{}", template_link(client.base(), &combo, image_url));
        }
    }
    Ok(())
}

/// Extract every layer into `manager`. Returns the stored names, bottom first.
///
/// Names are keyed by position, so a reference may repeat. Layers lying
/// entirely outside the canvas are skipped.
async fn add_layers<I: ImageSource>(
    manager: &TemplateManager<MemoryStore>,
    source: &I,
    config: &TrackerConfig,
    references: &[String],
    snapshot: &CanvasSnapshot,
) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(references.len());
    for (i, reference) in references.iter().enumerate() {
        let url = resolve_link(config, reference)?;
        let image = extract(source, &url, &snapshot.info)
            .await
            .with_context(|| format!("failed to extract `{reference}`"))?;
        if image.is_empty() {
            crate::log!("layer"; "`{}` lies outside the canvas, skipping", reference);
            continue;
        }

        let name = format!("{i}:{reference}");
        manager.add(Template {
            name: name.clone(),
            owner: 0,
            scope: Scope::Global,
            url,
            canvas_code: snapshot.info.code.clone(),
            progress: progress::compute(&snapshot.board, &image),
            image,
        })?;
        names.push(name);
    }
    if names.is_empty() {
        bail!("every layer lies outside the canvas");
    }
    Ok(names)
}
