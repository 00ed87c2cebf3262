//! Coordinator - Wires Up the Background Components
//!
//! # Responsibility
//!
//! The Coordinator is a **thin orchestrator** that:
//! - Starts the delta feed and performs the first full fetch underneath it
//! - Seeds the templates listed in the config
//! - Spawns the refresher and the progress tracker
//! - Stops everything again through [`Running::stop`]
//!
//! It does NOT contain business logic - that lives in `canvas/` and `template/`.
//!
//! # Architecture
//!
//! ```text
//! DeltaFeed (thread) ──┐
//!                      ├──> CanvasState <── ProgressTracker (task) ──> TemplateManager
//! Refresher (task) ────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::feed::{DeltaFeed, FeedHandle, FeedOptions};
use super::refresh::Refresher;
use super::tracker::ProgressTracker;
use crate::canvas::{CanvasClient, CanvasState};
use crate::config::TrackerConfig;
use crate::template::{TemplateManager, TemplateStore};

/// Coordinator - wires up and starts the background components
pub struct Coordinator<S> {
    config: Arc<TrackerConfig>,
    client: CanvasClient,
    state: Arc<CanvasState>,
    manager: Arc<TemplateManager<S>>,
}

/// Handle to the started components.
pub struct Running {
    shutdown: watch::Sender<bool>,
    feed: FeedHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl<S: TemplateStore + 'static> Coordinator<S> {
    pub fn new(config: Arc<TrackerConfig>, client: CanvasClient, manager: Arc<TemplateManager<S>>) -> Self {
        Self {
            config,
            client,
            state: Arc::new(CanvasState::new()),
            manager,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &Arc<CanvasState> {
        &self.state
    }

    /// Start all components. Fails if the first canvas fetch fails.
    pub async fn start(self) -> Result<Running> {
        let feed_options = FeedOptions {
            url: self
                .config
                .canvas
                .websocket_url()
                .context("invalid websocket URL")?,
            reconnect_delay: self.config.feed.reconnect_delay(),
            poll_interval: self.config.feed.poll_interval(),
        };
        // The feed runs before the first fetch; the fetch pauses it, so deltas
        // arriving meanwhile land on top of the fetched board.
        let feed = DeltaFeed::new(feed_options, Arc::clone(&self.state))
            .spawn()
            .context("failed to start feed thread")?;

        let refresher = Refresher::new(
            self.client.clone(),
            Arc::clone(&self.state),
            self.config.refresh.interval(),
        );
        let refreshed = match refresher.refresh_once().await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                tokio::task::spawn_blocking(move || feed.stop()).await.ok();
                return Err(e).context("initial canvas fetch failed");
            }
        };
        if let Some(info) = self.state.info() {
            crate::log!(
                "tracker";
                "canvas {}: {}x{}, {} colors",
                refreshed.code,
                info.width,
                info.height,
                info.palette.len()
            );
        }

        self.seed_templates().await;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let mut tasks = vec![tokio::spawn(refresher.run(shutdown_rx.clone()))];
        if self.config.tracker.enabled {
            let tracker = ProgressTracker::new(
                Arc::clone(&self.manager),
                Arc::clone(&self.state),
                self.config.tracker.interval(),
                self.config.tracker.sort,
            );
            tasks.push(tokio::spawn(tracker.run(shutdown_rx)));
        }

        crate::debug!("actor"; "started {} task(s)", tasks.len());
        Ok(Running {
            shutdown,
            feed,
            tasks,
        })
    }

    /// Add every configured template that isn't tracked yet on this canvas.
    ///
    /// Failures are logged; one bad link doesn't keep the others out.
    async fn seed_templates(&self) {
        let Some(snapshot) = self.state.snapshot() else {
            return;
        };
        for entry in &self.config.templates {
            match self.manager.get(&entry.name, &snapshot.info.code) {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => {
                    crate::log!("error"; "template `{}`: {}", entry.name, e);
                    continue;
                }
            }
            match self
                .manager
                .create(&self.client, entry.to_request(), &snapshot)
                .await
            {
                Ok(template) => crate::log!(
                    "tracker";
                    "tracking `{}` at ({}, {}), {:.1}% done",
                    template.name,
                    template.image.ox(),
                    template.image.oy(),
                    template.progress.percentage()
                ),
                Err(e) => crate::log!("error"; "template `{}`: {}", entry.name, e),
            }
        }
    }
}

impl Running {
    /// Signal every component and wait for them to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                crate::log!("error"; "background task failed: {}", e);
            }
        }
        let feed = self.feed;
        if tokio::task::spawn_blocking(move || feed.stop()).await.is_err() {
            crate::log!("error"; "feed shutdown failed");
        }
        crate::debug!("actor"; "stopped");
    }

    /// Whether the feed thread has exited on its own.
    pub fn feed_finished(&self) -> bool {
        self.feed.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::core::render::encode_png;
    use crate::template::MemoryStore;
    use image::{Rgba, RgbaImage};
    use std::io::{Read, Write};
    use std::net::TcpListener;

    const INFO: &str = r#"{"width": 3, "height": 2, "palette": ["000000", "FFFFFF"], "canvasCode": "c1"}"#;

    /// Minimal canvas service: `info`, an all-black `boarddata` and one image.
    fn serve_canvas() -> String {
        let png = encode_png(&RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 255]))).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut buf = [0u8; 4096];
                let n = stream.read(&mut buf).unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_owned();
                let (status, body) = match path.as_str() {
                    "/info" => ("200 OK", INFO.as_bytes().to_vec()),
                    "/boarddata" => ("200 OK", vec![0; 6]),
                    "/t.png" => ("200 OK", png.clone()),
                    _ => ("404 Not Found", Vec::new()),
                };
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
            }
        });
        addr
    }

    fn config(base: &str, link: &str) -> Arc<TrackerConfig> {
        Arc::new(test_parse_config(&format!(
            "[canvas]\nurl = \"{base}\"\nwebsocket = \"ws://127.0.0.1:1/ws\"\n\
             [feed]\nreconnect_delay_ms = 50\npoll_interval_ms = 50\n\
             [[template]]\nname = \"flag\"\nurl = \"{link}\"\n"
        )))
    }

    fn client(config: &TrackerConfig) -> CanvasClient {
        CanvasClient::new(config.canvas.base_url().unwrap(), config.canvas.timeout()).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_start_seeds_templates_and_stops() {
        let addr = serve_canvas();
        let link = format!("http://{addr}/#x=1&y=0&ox=1&oy=0&tw=1&template=http%3A%2F%2F{addr}%2Ft.png");
        let config = config(&format!("http://{addr}/"), &link);
        let manager = Arc::new(TemplateManager::new(MemoryStore::new()));

        let coordinator = Coordinator::new(Arc::clone(&config), client(&config), Arc::clone(&manager));
        let state = Arc::clone(coordinator.state());
        let running = coordinator.start().await.unwrap();

        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.info.code, "c1");
        assert_eq!(snapshot.board.pixels(), &[0; 6]);

        let flag = manager.get("flag", "c1").unwrap().unwrap();
        assert_eq!((flag.image.ox(), flag.image.oy()), (1, 0));
        assert_eq!(flag.image.get(0, 0), Some(1));
        assert_eq!((flag.progress.correct, flag.progress.total), (0, 1));

        running.stop().await;
    }

    #[tokio::test]
    async fn test_start_fails_without_canvas() {
        let config = config("http://127.0.0.1:1/", "https://x/#ox=0&oy=0&tw=1&template=y");
        let manager = Arc::new(TemplateManager::new(MemoryStore::new()));
        let coordinator = Coordinator::new(Arc::clone(&config), client(&config), manager);
        let state = Arc::clone(coordinator.state());

        assert!(coordinator.start().await.is_err());
        assert!(!state.is_initialized());
    }
}
