//! FLOE CLI - Command-line interface
//!
//! Commands:
//! - play: Play a game at the terminal against computer opponents
//! - match: Run computer-only games and report statistics
//! - config: Write the default configuration file

mod match_cmd;
mod play_cmd;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use floe_core::GameConfig;

#[derive(Parser)]
#[command(name = "floe")]
#[command(about = "FLOE penguin sliding game")]
struct Cli {
    /// Random seed for board generation and computer placement
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game at the terminal
    Play(play_cmd::PlayArgs),
    /// Run computer-only games
    Match(match_cmd::MatchArgs),
    /// Write the default configuration
    Config {
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::Config { output } => write_default_config(&output),
    }
}

fn write_default_config(path: &Path) -> anyhow::Result<()> {
    GameConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    tracing::info!("Wrote default config to {}", path.display());
    Ok(())
}

/// Config from file (or defaults) with the depth flag applied on top
pub(crate) fn load_config(path: Option<&Path>, depth: Option<u32>) -> anyhow::Result<GameConfig> {
    let mut config = match path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(depth) = depth {
        config = config.with_depth(depth);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
