//! `[refresh]` and `[tracker]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [refresh]
//! interval = 300              # Seconds between full board reloads
//!
//! [tracker]
//! enabled = true              # Recompute template progress periodically
//! interval = 600              # Seconds between progress runs
//! sort = "percentage-down"    # Report order: percentage-up, percentage-down, pixels-left
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::template::SortOrder;

/// Full board reload schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval: 300 }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.interval == 0 {
            diag.error("refresh.interval", "interval must be positive");
        }
    }
}

/// Scheduled progress job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSectionConfig {
    pub enabled: bool,
    pub interval: u64,
    pub sort: SortOrder,
}

impl Default for TrackerSectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 600,
            sort: SortOrder::PercentageDown,
        }
    }
}

impl TrackerSectionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.enabled && self.interval == 0 {
            diag.error("tracker.interval", "interval must be positive");
        }
    }
}
