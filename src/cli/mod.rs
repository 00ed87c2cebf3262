//! Command-line interface module.

mod args;
pub mod board;
pub mod common;
pub mod template;
pub mod watch;

pub use args::{Cli, Commands};
