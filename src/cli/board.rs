//! One-shot canvas commands: `board` and `cooldown`.

use std::path::Path;

use anyhow::{Context, Result};

use super::common::{block_on, connect, fetch_snapshot, write_image};
use crate::canvas::client::cooldown;
use crate::config::TrackerConfig;
use crate::core::render::render_with;

/// Save the current board as a PNG.
pub fn save_board(config: &TrackerConfig, output: &Path) -> Result<()> {
    let client = connect(config)?;
    let snapshot = block_on(fetch_snapshot(&client))??;
    let image = render_with(&snapshot.board, &snapshot.info.palette);
    write_image(&image, output)
}

/// Print the placement cooldown, fetching the user count if not given.
pub fn show_cooldown(config: &TrackerConfig, users: Option<u32>) -> Result<()> {
    let users = match users {
        Some(users) => users,
        None => {
            let client = connect(config)?;
            block_on(client.users())?.context("failed to fetch user count")?
        }
    };
    println!("{}", format_cooldown(users));
    Ok(())
}

fn format_cooldown(users: u32) -> String {
    let seconds = cooldown(users);
    format!(
        "{users} user{} online, cooldown {seconds:.2}s",
        if users == 1 { "" } else { "s" }
    )
}
