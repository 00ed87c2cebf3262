//! Background components keeping the canvas live.
//!
//! ```text
//! DeltaFeed ──pixels──> CanvasState <──replace── Refresher
//!                            │
//!                            └──snapshot──> ProgressTracker
//! ```
//!
//! # Module Structure
//!
//! - `feed` - websocket receive loop (dedicated thread)
//! - `refresh` - periodic full reload (tokio task)
//! - `tracker` - periodic template progress (tokio task)
//! - `coordinator` - explicit start and stop of all of the above

pub mod coordinator;
pub mod feed;
pub mod refresh;
pub mod tracker;

pub use coordinator::Coordinator;
