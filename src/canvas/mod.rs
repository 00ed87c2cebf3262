//! Live model of the shared canvas.
//!
//! ```text
//! DeltaFeed ──apply_batch──┐
//!                          ├──> CanvasState ──snapshot──> progress, rendering
//! Refresher ──pause/replace┘
//! ```
//!
//! # Module Structure
//!
//! - `info` - canvas metadata and its wire format
//! - `state` - the shared board and its mutation rules
//! - `gate` - pause gate between the feed and the refresher
//! - `client` - HTTP access to the canvas service

pub mod client;
pub mod gate;
pub mod info;
pub mod state;

pub use client::{CanvasClient, CanvasSource, ImageSource};
pub use info::CanvasInfo;
pub use state::{CanvasSnapshot, CanvasState, PixelDelta};
