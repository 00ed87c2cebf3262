//! Error taxonomy shared by the canvas and template pipelines.
//!
//! | Kind          | Raised by                          | Handling                       |
//! |---------------|------------------------------------|--------------------------------|
//! | `Validation`  | template links, names, palettes    | surfaced, never retried        |
//! | `Fetch`       | HTTP transport, timeouts           | retried by background loops    |
//! | `BadStatus`   | non-200 canvas/image responses     | retried by background loops    |
//! | `Protocol`    | malformed canvas responses         | surfaced / logged              |
//! | `Decode`      | undecodable template images        | surfaced                       |
//! | `State`       | board/info mismatches              | logged and absorbed            |

use thiserror::Error;

/// Result alias used throughout the tracker core.
pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),

    #[error("request to `{url}` failed")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{url}` returned status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("unexpected response from `{url}`: {reason}")]
    Protocol { url: String, reason: String },

    #[error("could not decode template image")]
    Decode(#[from] image::ImageError),

    #[error("{0}")]
    State(String),
}

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::BadStatus { .. })
    }
}
