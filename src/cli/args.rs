//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::template::SortOrder;

/// Live canvas mirror and template progress tracker
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: tracker.toml)
    #[arg(short = 'C', long, global = true, default_value = "tracker.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Canvas service base URL, overrides `canvas.url`
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Mirror the canvas live and track the configured templates
    #[command(visible_alias = "w")]
    Watch,

    /// Save the current board as a PNG
    #[command(visible_alias = "b")]
    Board {
        /// Output image path
        #[arg(short, long, default_value = "board.png", value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Measure a template against the current board
    #[command(visible_alias = "p")]
    Progress {
        /// Template link, or the name of a configured template
        template: String,

        /// Also save the per-pixel overlay (red wrong, green correct)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// List the configured templates with their progress
    #[command(visible_alias = "l")]
    List {
        /// Sort order (by name when omitted)
        #[arg(short, long, value_enum)]
        sort: Option<SortOrder>,

        /// List as this user id
        #[arg(long, default_value_t = 0)]
        user: u64,

        /// Faction of the listing user
        #[arg(long)]
        faction: Option<u64>,
    },

    /// Recover the true-size image behind a template link
    #[command(visible_alias = "d")]
    Detemplatize {
        /// Template link
        link: String,

        /// Output image path
        #[arg(short, long, default_value = "template.png", value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Snap an image onto the canvas palette
    #[command(visible_alias = "r")]
    Reduce {
        /// Image path or URL
        image: String,

        /// Output image path
        #[arg(short, long, default_value = "reduced.png", value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Combine templates, later ones on top
    Layer {
        /// Template links or configured template names, bottom first
        #[arg(required = true, num_args = 1..)]
        templates: Vec<String>,

        /// Output image path
        #[arg(short, long, default_value = "combo.png", value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,

        /// Also save a dotted, shareable version of the result
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        styled: Option<PathBuf>,

        /// Where the styled image will be hosted; prints a template link for it
        #[arg(long, requires = "styled")]
        image_url: Option<String>,
    },

    /// Show the current placement cooldown
    Cooldown {
        /// Online user count (fetched from the canvas when omitted)
        #[arg(short, long)]
        users: Option<u32>,
    },
}
