//! Canvas metadata and the `GET info` wire format.

use serde::Deserialize;

use crate::core::Palette;
use crate::error::{Result, TrackerError};

/// Canvas dimensions, palette and generation code.
///
/// The generation code changes whenever the canvas is reset; templates and
/// progress records are only meaningful for the code they were made under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasInfo {
    pub width: u32,
    pub height: u32,
    pub palette: Palette,
    pub code: String,
}

impl CanvasInfo {
    /// Number of bytes a board of this canvas has.
    pub fn board_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Parse the JSON body of `GET info`.
    #[cfg(test)]
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: InfoResponse = serde_json::from_str(body)
            .map_err(|e| TrackerError::validation(format!("bad canvas info: {e}")))?;
        raw.try_into()
    }
}

/// `GET info` body. Only the fields the tracker uses are declared.
#[derive(Debug, Deserialize)]
pub struct InfoResponse {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<PaletteEntry>,
    #[serde(rename = "canvasCode")]
    pub canvas_code: String,
}

/// Palette entries come either as bare hex strings or as named objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PaletteEntry {
    Hex(String),
    Named { value: String },
}

impl PaletteEntry {
    fn hex(&self) -> &str {
        match self {
            Self::Hex(value) | Self::Named { value } => value,
        }
    }
}

impl TryFrom<InfoResponse> for CanvasInfo {
    type Error = TrackerError;

    fn try_from(raw: InfoResponse) -> Result<Self> {
        let palette = Palette::from_hex(raw.palette.iter().map(PaletteEntry::hex))?;
        Ok(Self {
            width: raw.width,
            height: raw.height,
            palette,
            code: raw.canvas_code,
        })
    }
}
