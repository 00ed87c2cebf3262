//! Tracked templates and their persisted form.

use serde::{Deserialize, Serialize};

use crate::core::IndexedImage;
use crate::error::{Result, TrackerError};
use crate::progress::Progress;

/// Who can see and manage a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only the owning user.
    #[default]
    Private,
    /// Members of the owning faction; `owner` is the faction id.
    Faction,
    /// Everyone; managed by the owning user.
    Global,
}

impl Scope {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Faction => "faction",
            Self::Global => "global",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user asking for templates, and the faction they are acting from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user: u64,
    pub faction: Option<u64>,
}

impl Viewer {
    pub const fn user(user: u64) -> Self {
        Self { user, faction: None }
    }

    pub const fn in_faction(user: u64, faction: u64) -> Self {
        Self {
            user,
            faction: Some(faction),
        }
    }
}

/// A template tracked on one canvas generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    /// User id, or faction id for [`Scope::Faction`]
    pub owner: u64,
    pub scope: Scope,
    /// Template link the image was extracted from
    pub url: String,
    pub canvas_code: String,
    pub image: IndexedImage,
    pub progress: Progress,
}

impl Template {
    /// Same template with a freshly computed progress.
    pub fn with_progress(self, progress: Progress) -> Self {
        Self { progress, ..self }
    }

    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        match self.scope {
            Scope::Global => true,
            Scope::Private => self.owner == viewer.user,
            Scope::Faction => viewer.faction == Some(self.owner),
        }
    }

    /// Whether `viewer` may update or remove this template.
    pub fn is_managed_by(&self, viewer: &Viewer) -> bool {
        match self.scope {
            Scope::Private | Scope::Global => self.owner == viewer.user,
            Scope::Faction => viewer.faction == Some(self.owner),
        }
    }
}

// ============================================================================
// Persisted form
// ============================================================================

/// Pixel grid as stored: dimensions plus the row-major indices hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelGrid {
    pub width: u32,
    pub height: u32,
    pub data: String,
}

impl From<&IndexedImage> for PixelGrid {
    fn from(image: &IndexedImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: hex::encode(image.pixels()),
        }
    }
}

/// One stored template document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub name: String,
    pub owner: u64,
    pub scope: Scope,
    pub canvas_code: String,
    pub ox: i32,
    pub oy: i32,
    pub url: String,
    pub image: PixelGrid,
    #[serde(default)]
    pub progress: Progress,
}

impl From<&Template> for TemplateRecord {
    fn from(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            owner: template.owner,
            scope: template.scope,
            canvas_code: template.canvas_code.clone(),
            ox: template.image.ox(),
            oy: template.image.oy(),
            url: template.url.clone(),
            image: PixelGrid::from(&template.image),
            progress: template.progress,
        }
    }
}

impl TryFrom<TemplateRecord> for Template {
    type Error = TrackerError;

    fn try_from(record: TemplateRecord) -> Result<Self> {
        let pixels = hex::decode(&record.image.data).map_err(|e| {
            TrackerError::state(format!("template `{}` has a corrupt pixel grid: {e}", record.name))
        })?;
        let image = IndexedImage::new(record.image.width, record.image.height, pixels)?
            .with_origin(record.ox, record.oy);
        Ok(Self {
            name: record.name,
            owner: record.owner,
            scope: record.scope,
            url: record.url,
            canvas_code: record.canvas_code,
            image,
            progress: record.progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TRANSPARENT;

    fn template(scope: Scope) -> Template {
        Template {
            name: "seon".into(),
            owner: 42,
            scope,
            url: "https://pxls.space/#ox=1&oy=2&tw=2&template=x".into(),
            canvas_code: "66".into(),
            image: IndexedImage::new(2, 1, vec![3, TRANSPARENT]).unwrap().with_origin(1, 2),
            progress: Progress::new(1, 1),
        }
    }

    #[test]
    fn test_visibility() {
        let owner = Viewer::user(42);
        let stranger = Viewer::in_faction(7, 99);
        let member = Viewer::in_faction(7, 42);

        let private = template(Scope::Private);
        assert!(private.is_visible_to(&owner));
        assert!(!private.is_visible_to(&stranger));

        let faction = template(Scope::Faction);
        assert!(faction.is_visible_to(&member));
        assert!(!faction.is_visible_to(&stranger));
        assert!(!faction.is_visible_to(&owner));

        let global = template(Scope::Global);
        assert!(global.is_visible_to(&stranger));
        assert!(global.is_managed_by(&owner));
        assert!(!global.is_managed_by(&stranger));
    }

    #[test]
    fn test_record_conversion() {
        let original = template(Scope::Faction);
        let record = TemplateRecord::from(&original);
        assert_eq!(record.image.data, "03ff");
        assert_eq!((record.ox, record.oy), (1, 2));

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""scope":"faction""#));
        let parsed: TemplateRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(Template::try_from(parsed).unwrap(), original);
    }

    #[test]
    fn test_corrupt_record_is_rejected() {
        let mut record = TemplateRecord::from(&template(Scope::Global));
        record.image.data = "03".into();
        assert!(Template::try_from(record.clone()).is_err());
        record.image.data = "zz".into();
        assert!(Template::try_from(record).is_err());
    }
}
