//! `[canvas]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [canvas]
//! url = "https://pxls.space/"        # Canvas service base URL
//! websocket = "wss://pxls.space/ws"  # Optional, derived from `url` when absent
//! timeout = 30                       # HTTP timeout in seconds
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ConfigDiagnostics;

/// Canvas service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Base URL; `info`, `boarddata` and `users` are resolved against it.
    pub url: String,

    /// Websocket endpoint of the live pixel feed.
    pub websocket: Option<String>,

    /// Timeout for every HTTP request, in seconds.
    pub timeout: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            url: "https://pxls.space/".into(),
            websocket: None,
            timeout: 30,
        }
    }
}

impl CanvasConfig {
    /// Parsed base URL, with a trailing slash so endpoints join below it.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Feed endpoint: `websocket` if set, else `ws(s)://<host>/ws` next to `url`.
    pub fn websocket_url(&self) -> Result<String, url::ParseError> {
        if let Some(websocket) = &self.websocket {
            return Ok(websocket.clone());
        }
        let mut url = self.base_url()?.join("ws")?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) stays within the special schemes, so this cannot fail.
        let _ = url.set_scheme(scheme);
        Ok(url.into())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        match self.base_url() {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => diag.error(
                "canvas.url",
                format!("unsupported scheme `{}`, expected http or https", url.scheme()),
            ),
            Err(e) => diag.error("canvas.url", format!("invalid URL `{}`: {e}", self.url)),
        }

        if let Some(websocket) = &self.websocket {
            match Url::parse(websocket) {
                Ok(url) if matches!(url.scheme(), "ws" | "wss") => {}
                Ok(_) => diag.error("canvas.websocket", "websocket URL must use ws or wss"),
                Err(e) => diag.error("canvas.websocket", format!("invalid URL `{websocket}`: {e}")),
            }
        }

        if self.timeout == 0 {
            diag.error("canvas.timeout", "timeout must be positive");
        }
    }
}
