//! Progress Tracker - Scheduled Template Recompute
//!
//! Periodically measures every template of the current canvas generation
//! against a fresh [`CanvasState`] snapshot and stores the new progress.
//! Templates left over from a previous generation are not touched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::canvas::CanvasState;
use crate::template::manager::sort_templates;
use crate::template::{SortOrder, Template, TemplateManager, TemplateStore};

pub struct ProgressTracker<S> {
    manager: Arc<TemplateManager<S>>,
    state: Arc<CanvasState>,
    interval: Duration,
    order: SortOrder,
}

impl<S: TemplateStore + 'static> ProgressTracker<S> {
    pub fn new(
        manager: Arc<TemplateManager<S>>,
        state: Arc<CanvasState>,
        interval: Duration,
        order: SortOrder,
    ) -> Self {
        Self {
            manager,
            state,
            interval,
            order,
        }
    }

    /// Recompute all templates once. `None` before the first board fetch.
    pub fn track_once(&self) -> Option<Vec<Template>> {
        let snapshot = self.state.snapshot()?;
        let mut templates = self.manager.recompute_progress(&snapshot);
        sort_templates(&mut templates, self.order);
        Some(templates)
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let this = Arc::new(self);
        let mut ticker = interval_at(Instant::now() + this.interval, this.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let job = Arc::clone(&this);
                    match tokio::task::spawn_blocking(move || job.track_once()).await {
                        Ok(Some(templates)) => report(&templates),
                        Ok(None) => crate::debug!("tracker"; "no board yet, skipping"),
                        Err(e) => crate::log!("error"; "progress job failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        crate::debug!("tracker"; "stopped");
    }
}

fn report(templates: &[Template]) {
    if templates.is_empty() {
        crate::debug!("tracker"; "no templates tracked");
        return;
    }
    for template in templates {
        let progress = &template.progress;
        crate::log!(
            "tracker";
            "{}: {:.1}% ({}/{}, {} left)",
            template.name,
            progress.percentage(),
            progress.correct,
            progress.total,
            progress.remaining()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasInfo, PixelDelta};
    use crate::core::{IndexedImage, Palette};
    use crate::progress::Progress;
    use crate::template::{MemoryStore, Scope};

    fn setup() -> (Arc<CanvasState>, Arc<TemplateManager<MemoryStore>>) {
        let state = Arc::new(CanvasState::new());
        let info = CanvasInfo {
            width: 4,
            height: 4,
            palette: Palette::from_hex(["000000", "FFFFFF"]).unwrap(),
            code: "9".into(),
        };
        state.initialize(info, IndexedImage::filled(4, 4, 0)).unwrap();

        let manager = Arc::new(TemplateManager::new(MemoryStore::new()));
        for (name, fill) in [("white", 1), ("black", 0)] {
            manager
                .add(Template {
                    name: name.into(),
                    owner: 1,
                    scope: Scope::Global,
                    url: String::new(),
                    canvas_code: "9".into(),
                    image: IndexedImage::filled(2, 1, fill),
                    progress: Progress::default(),
                })
                .unwrap();
        }
        (state, manager)
    }

    #[test]
    fn test_track_once_follows_the_board() {
        let (state, manager) = setup();
        let tracker = ProgressTracker::new(
            Arc::clone(&manager),
            Arc::clone(&state),
            Duration::from_secs(60),
            SortOrder::PercentageDown,
        );

        let first = tracker.track_once().unwrap();
        let names: Vec<_> = first.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["black", "white"]);
        assert_eq!(first[1].progress, Progress::new(0, 2));

        state.apply_delta(PixelDelta::new(1, 0, 1));
        tracker.track_once().unwrap();
        let white = manager.get("white", "9").unwrap().unwrap();
        assert_eq!(white.progress, Progress::new(1, 2));
    }

    #[test]
    fn test_track_once_without_board() {
        let manager = Arc::new(TemplateManager::new(MemoryStore::new()));
        let tracker = ProgressTracker::new(
            manager,
            Arc::new(CanvasState::new()),
            Duration::from_secs(60),
            SortOrder::PixelsLeft,
        );
        assert!(tracker.track_once().is_none());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (state, manager) = setup();
        let tracker = ProgressTracker::new(
            Arc::clone(&manager),
            state,
            Duration::from_millis(10),
            SortOrder::PercentageUp,
        );
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(tracker.run(rx));

        let deadline = Instant::now() + Duration::from_secs(5);
        let black = || manager.get("black", "9").unwrap().unwrap().progress;
        while black() != Progress::new(2, 2) && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(black(), Progress::new(2, 2));

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
