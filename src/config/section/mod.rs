//! Configuration section definitions.
//!
//! Each module corresponds to a section in `tracker.toml`:
//!
//! | Module     | TOML Section              | Purpose                        |
//! |------------|---------------------------|--------------------------------|
//! | `canvas`   | `[canvas]`                | Service URLs and HTTP timeout  |
//! | `feed`     | `[feed]`                  | Live feed reconnect behaviour  |
//! | `schedule` | `[refresh]`, `[tracker]`  | Background job intervals       |
//! | `template` | `[[template]]`            | Templates tracked from startup |

mod canvas;
mod feed;
mod schedule;
mod template;

pub use canvas::CanvasConfig;
pub use feed::FeedConfig;
pub use schedule::{RefreshConfig, TrackerSectionConfig};
pub use template::{TemplateEntry, validate_templates};
