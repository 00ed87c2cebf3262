//! `watch`: keep a live mirror of the canvas until Ctrl+C.

use std::sync::Arc;

use anyhow::Result;

use super::common::{block_on, connect};
use crate::actor::Coordinator;
use crate::config::TrackerConfig;
use crate::shutdown::register_shutdown;
use crate::template::{MemoryStore, TemplateManager};

pub fn run(config: TrackerConfig) -> Result<()> {
    let client = connect(&config)?;
    let config = Arc::new(config);
    let manager = Arc::new(TemplateManager::new(MemoryStore::new()));

    block_on(async move {
        let shutdown = register_shutdown();
        let running = Coordinator::new(config, client, manager).start().await?;
        crate::log!("tracker"; "watching, press Ctrl+C to stop");

        // Ctrl+C arrives on a crossbeam channel; wait for it off the runtime.
        tokio::task::spawn_blocking(move || shutdown.recv().ok()).await?;
        if running.feed_finished() {
            crate::log!("warning"; "feed thread exited early");
        }
        running.stop().await;
        Ok::<_, anyhow::Error>(())
    })?
}
