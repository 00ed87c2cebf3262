//! `[feed]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [feed]
//! reconnect_delay_ms = 2000   # Wait between reconnect attempts
//! poll_interval_ms = 1000     # Socket read timeout, bounds shutdown latency
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

/// Live feed connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub reconnect_delay_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 2000,
            poll_interval_ms: 1000,
        }
    }
}

impl FeedConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        // A zero read timeout is rejected by the OS.
        if self.poll_interval_ms == 0 {
            diag.error("feed.poll_interval_ms", "poll interval must be positive");
        }
        if self.reconnect_delay_ms == 0 {
            diag.error_with_hint(
                "feed.reconnect_delay_ms",
                "reconnect delay must be positive",
                "a failing endpoint would be retried in a tight loop",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_feed_config() {
        let config = test_parse_config("[feed]\nreconnect_delay_ms = 500");
        assert_eq!(config.feed.reconnect_delay().as_millis(), 500);
        assert_eq!(config.feed.poll_interval().as_millis(), 1000);
    }

    #[test]
    fn test_feed_rejects_zero() {
        let config = test_parse_config("[feed]\nreconnect_delay_ms = 0\npoll_interval_ms = 0");
        let mut diag = ConfigDiagnostics::new();
        config.feed.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }
}
