#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Arena Siege waves headlessly.

mod config;
mod simulation;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::ArenaConfig;
use simulation::{Mode, Settings, Simulation};

/// Headless Arena Siege simulation.
#[derive(Debug, Parser)]
#[command(name = "arena", version, about = "Plays Arena Siege waves without a renderer")]
struct Cli {
    /// Arena file to load instead of the built-in arena.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Seed shared by spawn and loot randomness.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,

    /// Maximum number of ticks before the run is abandoned.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u32,

    /// Ticks between two enemy kills, 0 to never kill.
    #[arg(long, default_value_t = 4)]
    kill_every: u32,

    /// Health the player loses per alive enemy per second.
    #[arg(long, default_value_t = 0.0)]
    contact_damage: f32,

    /// Prints the run summary as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    mode: ModeArg,
}

#[derive(Debug, Subcommand)]
enum ModeArg {
    /// Plays one randomized wave; a negative count ends immediately.
    Wave {
        /// Number of enemies to spawn.
        #[arg(allow_negative_numbers = true)]
        count: i32,
    },
    /// Plays every wave of a scripted stage.
    Stage {
        /// Name of the stage in the arena file.
        name: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let arena = match &cli.config {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::builtin()?,
    };
    let settings = Settings {
        seed: cli.seed,
        tick: Duration::from_millis(cli.tick_ms.max(1)),
        tick_limit: cli.max_ticks,
        kill_every: cli.kill_every,
        contact_damage: cli.contact_damage,
    };
    let mode = match cli.mode {
        ModeArg::Wave { count } => Mode::Wave(count),
        ModeArg::Stage { name } => Mode::Stage(name),
    };

    let summary = Simulation::new(&arena, settings)?.run(&arena, mode)?;
    if cli.json {
        let encoded =
            serde_json::to_string_pretty(&summary).context("failed to encode run summary")?;
        println!("{encoded}");
    } else {
        print!("{summary}");
    }
    Ok(())
}
