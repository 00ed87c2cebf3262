//! Template bookkeeping on top of a [`TemplateStore`].
//!
//! Templates are scoped by canvas generation code: a name is unique within a
//! code, and a canvas reset leaves the previous generation's templates behind
//! untouched.

use serde::{Deserialize, Serialize};

use super::extract;
use super::model::{Scope, Template, TemplateRecord, Viewer};
use super::store::{TemplateFilter, TemplateStore};
use crate::canvas::{CanvasSnapshot, ImageSource};
use crate::compositor;
use crate::core::IndexedImage;
use crate::error::{Result, TrackerError};
use crate::progress;

/// Name reserved for combined views.
pub const COMBO_NAME: &str = "combo";

/// Listing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Least complete first.
    PercentageUp,
    /// Most complete first.
    PercentageDown,
    /// Fewest pixels left first.
    PixelsLeft,
}

/// Parameters for a template created from a link.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub url: String,
    pub owner: u64,
    pub scope: Scope,
}

pub struct TemplateManager<S> {
    store: S,
}

impl<S: TemplateStore> TemplateManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[allow(dead_code)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Extract a template from its link, measure it and store it.
    pub async fn create<I: ImageSource>(
        &self,
        source: &I,
        request: NewTemplate,
        canvas: &CanvasSnapshot,
    ) -> Result<Template> {
        check_name(&request.name)?;
        let image = extract::extract(source, &request.url, &canvas.info).await?;
        let template = Template {
            progress: progress::compute(&canvas.board, &image),
            name: request.name,
            owner: request.owner,
            scope: request.scope,
            url: request.url,
            canvas_code: canvas.info.code.clone(),
            image,
        };
        self.add(template.clone())?;
        Ok(template)
    }

    /// Store a new template.
    pub fn add(&self, template: Template) -> Result<()> {
        check_name(&template.name)?;
        if template.image.is_empty() {
            return Err(TrackerError::validation(format!(
                "template `{}` lies entirely outside the canvas",
                template.name
            )));
        }
        if !self.store.insert_if_absent(TemplateRecord::from(&template)) {
            return Err(TrackerError::validation(format!(
                "a template named `{}` already exists",
                template.name
            )));
        }
        crate::debug!("template"; "added `{}` ({} pixels)", template.name, template.progress.total);
        Ok(())
    }

    /// Overwrite an existing template on behalf of `viewer`.
    #[allow(dead_code)]
    pub fn update(&self, template: Template, viewer: &Viewer) -> Result<()> {
        self.managed(&template.name, &template.canvas_code, viewer)?;
        if template.image.is_empty() {
            return Err(TrackerError::validation(format!(
                "template `{}` lies entirely outside the canvas",
                template.name
            )));
        }
        if !self.store.replace(TemplateRecord::from(&template)) {
            return Err(TrackerError::validation(format!(
                "no template named `{}`",
                template.name
            )));
        }
        Ok(())
    }

    /// Delete a template on behalf of `viewer` and return it.
    #[allow(dead_code)]
    pub fn remove(&self, name: &str, canvas_code: &str, viewer: &Viewer) -> Result<Template> {
        let template = self.managed(name, canvas_code, viewer)?;
        self.store.delete(name, canvas_code);
        crate::debug!("template"; "removed `{name}`");
        Ok(template)
    }

    pub fn get(&self, name: &str, canvas_code: &str) -> Result<Option<Template>> {
        self.store
            .get(name, canvas_code)
            .map(Template::try_from)
            .transpose()
    }

    fn require(&self, name: &str, canvas_code: &str) -> Result<Template> {
        self.get(name, canvas_code)?
            .ok_or_else(|| TrackerError::validation(format!("no template named `{name}`")))
    }

    fn managed(&self, name: &str, canvas_code: &str, viewer: &Viewer) -> Result<Template> {
        let template = self.require(name, canvas_code)?;
        if !template.is_managed_by(viewer) {
            return Err(TrackerError::validation(format!(
                "you are not allowed to manage the {} template `{name}`",
                template.scope
            )));
        }
        Ok(template)
    }

    /// Templates of `canvas_code` that `viewer` can see, ordered by `order`
    /// (by name when `None`).
    pub fn list_visible(
        &self,
        canvas_code: &str,
        viewer: &Viewer,
        order: Option<SortOrder>,
    ) -> Result<Vec<Template>> {
        let mut templates = self
            .store
            .find(&TemplateFilter::canvas(canvas_code))
            .into_iter()
            .map(Template::try_from)
            .filter(|t| t.as_ref().map_or(true, |t| t.is_visible_to(viewer)))
            .collect::<Result<Vec<_>>>()?;

        if let Some(order) = order {
            sort_templates(&mut templates, order);
        }
        Ok(templates)
    }

    /// Layer the named templates, later names on top.
    pub fn combine(&self, names: &[&str], canvas: &CanvasSnapshot) -> Result<IndexedImage> {
        let templates = names
            .iter()
            .map(|name| self.require(name, &canvas.info.code))
            .collect::<Result<Vec<_>>>()?;
        compositor::layer(
            canvas.info.width,
            canvas.info.height,
            templates.iter().map(|t| &t.image),
        )
    }

    /// Recompute and store the progress of every template on the snapshot's
    /// canvas. Returns the refreshed templates.
    ///
    /// Records that fail to load are logged and skipped. A template removed or
    /// updated while its progress was being measured keeps the newer state and
    /// is left out of the result.
    pub fn recompute_progress(&self, canvas: &CanvasSnapshot) -> Vec<Template> {
        let records = self.store.find(&TemplateFilter::canvas(canvas.info.code.as_str()));
        let mut updated = Vec::with_capacity(records.len());
        for record in records {
            let template = match Template::try_from(record.clone()) {
                Ok(template) => template,
                Err(e) => {
                    crate::log!("error"; "skipping template `{}`: {e}", record.name);
                    continue;
                }
            };
            let progress = progress::compute(&canvas.board, &template.image);
            if !self.store.update_progress(&record, progress) {
                crate::debug!("template"; "`{}` changed during recompute, skipping", record.name);
                continue;
            }
            updated.push(template.with_progress(progress));
        }
        updated
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TrackerError::validation("template name cannot be empty"));
    }
    if name.eq_ignore_ascii_case(COMBO_NAME) {
        return Err(TrackerError::validation(format!("`{COMBO_NAME}` is a reserved name")));
    }
    Ok(())
}

/// Stable sort, so equal keys keep their current order.
pub fn sort_templates(templates: &mut [Template], order: SortOrder) {
    match order {
        SortOrder::PercentageUp => templates
            .sort_by(|a, b| a.progress.percentage().total_cmp(&b.progress.percentage())),
        SortOrder::PercentageDown => templates
            .sort_by(|a, b| b.progress.percentage().total_cmp(&a.progress.percentage())),
        SortOrder::PixelsLeft => templates.sort_by_key(|t| t.progress.remaining()),
    }
}
