//! Template links.
//!
//! A template link is a canvas URL whose fragment is a query string:
//!
//! ```text
//! https://pxls.space/#x=500&y=300&ox=450&oy=260&tw=100&template=https%3A%2F%2Fi.imgur.com%2Fabc.png
//! ```
//!
//! `template` is the styled image, `tw` its true width in canvas pixels and
//! `ox`/`oy` the canvas position of its top-left corner.

use std::str::FromStr;

use url::form_urlencoded;

use crate::error::{Result, TrackerError};

/// Substrings every template link contains.
const REQUIRED_MARKERS: [&str; 5] = ["://", "ox", "oy", "template", "tw"];

/// Cheap shape check done before attempting a full parse.
///
/// Also used to tell a link apart from a template name in user input.
pub fn looks_like_template_link(input: &str) -> bool {
    REQUIRED_MARKERS.iter().all(|marker| input.contains(marker))
}

/// Parameters extracted from a template link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLink {
    /// Nested styled image URL (decoded)
    pub image_url: String,
    /// True width in canvas pixels; `<= 0` means "already true size"
    pub true_width: i64,
    pub ox: i32,
    pub oy: i32,
}

impl TemplateLink {
    pub fn parse(link: &str) -> Result<Self> {
        if !looks_like_template_link(link) {
            return Err(TrackerError::validation(
                "not a template link: expected `ox`, `oy`, `tw` and `template` parameters",
            ));
        }
        let (_, fragment) = link
            .split_once('#')
            .ok_or_else(|| TrackerError::validation("template link has no `#` parameters"))?;

        let mut image_url = None;
        let mut true_width = None;
        let mut ox = None;
        let mut oy = None;
        // First occurrence of each key wins.
        for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                "template" if image_url.is_none() => image_url = Some(value.into_owned()),
                "tw" if true_width.is_none() => true_width = Some(parse_int::<i64>("tw", &value)?),
                "ox" if ox.is_none() => ox = Some(parse_int::<i32>("ox", &value)?),
                "oy" if oy.is_none() => oy = Some(parse_int::<i32>("oy", &value)?),
                _ => {}
            }
        }

        Ok(Self {
            image_url: image_url.ok_or_else(|| missing("template"))?,
            true_width: true_width.ok_or_else(|| missing("tw"))?,
            ox: ox.ok_or_else(|| missing("ox"))?,
            oy: oy.ok_or_else(|| missing("oy"))?,
        })
    }
}

impl FromStr for TemplateLink {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn missing(key: &str) -> TrackerError {
    TrackerError::validation(format!("template link is missing `{key}`"))
}

fn parse_int<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TrackerError::validation(format!("`{key}` must be an integer, got `{value}`")))
}
