//! HTTP client for the canvas service.
//!
//! | Endpoint        | Body                                   |
//! |-----------------|----------------------------------------|
//! | `GET info`      | JSON: size, palette, `canvasCode`      |
//! | `GET boarddata` | one byte per pixel, row-major          |
//! | `GET users`     | JSON: `{"count": n}`                   |
//!
//! Template images are downloaded through the same client so they share its
//! timeout.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::info::{CanvasInfo, InfoResponse};
use crate::core::IndexedImage;
use crate::error::{Result, TrackerError};

/// Where the refresher gets full canvas state from.
pub trait CanvasSource: Send + Sync {
    fn fetch_info(&self) -> impl Future<Output = Result<CanvasInfo>> + Send;

    fn fetch_board(&self, info: &CanvasInfo) -> impl Future<Output = Result<IndexedImage>> + Send;
}

/// Where template extraction downloads styled images from.
pub trait ImageSource: Send + Sync {
    fn fetch_image(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    count: u32,
}

/// Client bound to one canvas service base URL.
#[derive(Debug, Clone)]
pub struct CanvasClient {
    http: reqwest::Client,
    base: Url,
}

impl CanvasClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| TrackerError::Fetch {
                url: base.to_string(),
                source,
            })?;
        Ok(Self { http, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| TrackerError::validation(format!("bad endpoint `{path}`: {e}")))
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| TrackerError::Fetch {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let response = self.get(url.clone()).await?;
        let bytes = response.bytes().await.map_err(|source| TrackerError::Fetch {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        let bytes = self.get_bytes(url.clone()).await?;
        serde_json::from_slice(&bytes).map_err(|e| TrackerError::Protocol {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// `GET info`.
    pub async fn info(&self) -> Result<CanvasInfo> {
        let url = self.endpoint("info")?;
        let raw: InfoResponse = self.get_json(url.clone()).await?;
        CanvasInfo::try_from(raw).map_err(|e| TrackerError::Protocol {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// `GET boarddata`, checked against the size in `info`.
    pub async fn board(&self, info: &CanvasInfo) -> Result<IndexedImage> {
        let url = self.endpoint("boarddata")?;
        let bytes = self.get_bytes(url.clone()).await?;
        decode_board(info, bytes).map_err(|reason| TrackerError::Protocol {
            url: url.to_string(),
            reason,
        })
    }

    /// `GET users`: number of users currently online.
    pub async fn users(&self) -> Result<u32> {
        let url = self.endpoint("users")?;
        let raw: UsersResponse = self.get_json(url).await?;
        Ok(raw.count)
    }

    /// Download an arbitrary image URL.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url)
            .map_err(|e| TrackerError::validation(format!("bad image url `{url}`: {e}")))?;
        self.get_bytes(url).await
    }
}

/// Validate raw board bytes against the canvas info.
fn decode_board(info: &CanvasInfo, bytes: Vec<u8>) -> std::result::Result<IndexedImage, String> {
    if bytes.len() != info.board_len() {
        return Err(format!(
            "expected {} bytes for a {}x{} board, got {}",
            info.board_len(),
            info.width,
            info.height,
            bytes.len()
        ));
    }
    IndexedImage::new(info.width, info.height, bytes).map_err(|e| e.to_string())
}

/// Seconds between placements with `users` online.
pub fn cooldown(users: u32) -> f64 {
    2.5 * (f64::from(users) + 11.96).sqrt() + 6.5
}

impl CanvasSource for CanvasClient {
    async fn fetch_info(&self) -> Result<CanvasInfo> {
        self.info().await
    }

    async fn fetch_board(&self, info: &CanvasInfo) -> Result<IndexedImage> {
        self.board(info).await
    }
}

impl ImageSource for CanvasClient {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        self.download(url).await
    }
}
