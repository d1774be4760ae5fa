#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless snake-rooms session.

mod autopilot;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use snake_rooms_core::GameConfig;
use snake_rooms_game::Game;
use tracing_subscriber::EnvFilter;

/// Runs the simulation without a renderer, steering with the autopilot.
#[derive(Debug, Parser)]
#[command(name = "snake-rooms", about = "Headless snake-rooms simulation")]
struct Cli {
    /// Seed string; overrides the configuration file.
    #[arg(long)]
    seed: Option<String>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 1_000)]
    ticks: u64,
    /// TOML file holding a game configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print every tick result as a JSON line.
    #[arg(long)]
    json: bool,
    /// Keep playing after a death instead of stopping.
    #[arg(long)]
    restart: bool,
    /// Print the final room layout.
    #[arg(long)]
    layout: bool,
}

/// Entry point for the snake-rooms command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed.clone();
    }
    let mut game = Game::new(config).context("invalid game configuration")?;

    let mut deaths = 0_u32;
    for _ in 0..cli.ticks {
        if let Some(direction) = autopilot::choose_direction(&game) {
            let _ = game.set_direction(direction);
        }
        let result = game.step(false);
        if result.quest_offer.is_some() {
            let _ = game.accept_quest();
        }
        if cli.json {
            println!(
                "{}",
                serde_json::to_string(&result).context("failed to encode tick result")?
            );
        }
        if !result.is_alive() {
            deaths += 1;
            tracing::info!(tick = result.tick, reason = ?result.death_reason, score = result.score, "run_ended");
            if !cli.restart {
                break;
            }
            game.reset();
        }
    }

    tracing::info!(
        score = game.score(),
        length = game.snake_length(),
        room = %game.current_room_id(),
        rooms_visited = game.stats().rooms_visited.len(),
        deaths,
        "session_finished"
    );
    if cli.layout {
        if let Some(room) = game.current_room() {
            for row in room.layout_rows() {
                println!("{row}");
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
