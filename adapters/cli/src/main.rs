#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Strata Maze in a terminal.

mod input;
mod maps;
mod settings;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use strata_maze_core::{MapSource, WELCOME_BANNER};
use strata_maze_rendering::TextRenderer;
use strata_maze_system_lifecycle::{Game, SessionSettings};
use strata_maze_system_tick::ThreadClock;

use crate::{
    input::LineInput,
    maps::{BuiltinMaps, DirectoryMaps},
};

/// Tile-based multi-level maze played in the terminal.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Directory of `*.json` map files; the built-in maps are used when omitted.
    #[arg(long, value_name = "DIR")]
    maps: Option<PathBuf>,
    /// TOML settings file with pacing and display options.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log filter overriding `RUST_LOG`, for example `debug`.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

/// Entry point for the Strata Maze command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = &cli.log_level {
        let _ = logger.parse_filters(filter);
    }
    logger.init();

    let settings = settings::load_settings(cli.config.as_deref())?;
    println!("{WELCOME_BANNER}");

    match cli.maps {
        Some(directory) => {
            info!("reading maps from {}", directory.display());
            play(DirectoryMaps::new(directory), settings)
        }
        None => play(BuiltinMaps::load()?, settings),
    }
}

fn play<M: MapSource>(maps: M, settings: SessionSettings) -> Result<()> {
    let input = LineInput::new(io::stdin().lock(), io::stdout());
    let renderer = TextRenderer::new(io::stdout());
    let mut game = Game::new(maps, input, renderer, ThreadClock, settings);
    game.run().context("session ended abnormally")?;
    info!("goodbye");
    Ok(())
}
