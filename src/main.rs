//! canvas-tracker - A live pixel-canvas mirror with template progress tracking.

mod actor;
mod canvas;
mod cli;
mod compositor;
mod config;
mod core;
mod error;
mod logger;
mod progress;
mod shutdown;
mod template;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::template::LayerOutput;
use cli::{Cli, Commands};
use config::TrackerConfig;
use template::Viewer;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    shutdown::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = TrackerConfig::load(&cli)?;
    if !config.config_path.as_os_str().is_empty() {
        debug!("config"; "loaded {}", config.config_path.display());
    }

    match &cli.command {
        Commands::Watch => cli::watch::run(config),
        Commands::Board { output } => cli::board::save_board(&config, output),
        Commands::Cooldown { users } => cli::board::show_cooldown(&config, *users),
        Commands::Progress { template, output } => {
            cli::template::show_progress(&config, template, output.as_deref())
        }
        Commands::List {
            sort,
            user,
            faction,
        } => {
            let viewer = match faction {
                Some(faction) => Viewer::in_faction(*user, *faction),
                None => Viewer::user(*user),
            };
            cli::template::list(&config, viewer, *sort)
        }
        Commands::Detemplatize { link, output } => {
            cli::template::detemplatize_link(&config, link, output)
        }
        Commands::Reduce { image, output } => cli::template::reduce_image(&config, image, output),
        Commands::Layer {
            templates,
            output,
            styled,
            image_url,
        } => cli::template::layer(
            &config,
            templates,
            LayerOutput {
                output,
                styled: styled.as_deref(),
                image_url: image_url.as_deref(),
            },
        ),
    }
}
