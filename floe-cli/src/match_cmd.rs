//! Match command - play computer-only games and summarize them
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: seeding and formatting utilities

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use floe_core::{GameConfig, PlayerSpec, Session};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of computer players per game (2-4)
    #[arg(long, default_value = "2")]
    pub players: usize,

    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Search depth (overrides the config file)
    #[arg(long)]
    pub depth: Option<u32>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Play games on all cores
    #[arg(long)]
    pub parallel: bool,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    scores: Vec<u32>,
    winners: Vec<usize>,
    plies: usize,
}

/// Aggregated match results
#[derive(Clone, Debug, Serialize)]
struct MatchResults {
    total_games: usize,
    /// Games won per seat; a shared win counts for every tied seat
    wins: Vec<usize>,
    shared_wins: usize,
    avg_plies: f32,
    avg_fish: f32,
    games: Vec<GameRecord>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Resolve configuration
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    if !(2..=4).contains(&args.players) {
        bail!("--players must be between 2 and 4, got {}", args.players);
    }
    let config = crate::load_config(args.config.as_deref(), args.depth)?;

    tracing::info!(
        "Starting match: {} players, {} games, {}x{} board, depth={}",
        args.players,
        args.games,
        config.rows,
        config.cols,
        config.search.depth
    );

    let results = play_match(&config, &args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(config: &GameConfig, args: &MatchArgs, seed: Option<u64>) -> Result<MatchResults> {
    let base_seed = base_seed(seed);

    let play = |index: usize| -> Result<GameRecord> {
        let record = play_single_game(config, args.players, index + 1, base_seed.wrapping_add(index as u64))?;
        tracing::info!(
            "Game {}: scores {:?}, winners {:?} ({} moves)",
            record.game_number,
            record.scores,
            record.winners,
            record.plies
        );
        Ok(record)
    };

    let games = if args.parallel {
        (0..args.games).into_par_iter().map(play).collect::<Result<Vec<_>>>()?
    } else {
        (0..args.games).map(play).collect::<Result<Vec<_>>>()?
    };

    Ok(compute_statistics(games, args.players))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one computer-only game to the end
fn play_single_game(config: &GameConfig, players: usize, game_number: usize, seed: u64) -> Result<GameRecord> {
    let specs: Vec<PlayerSpec> = (0..players as u8).map(PlayerSpec::computer).collect();
    let mut session = Session::with_seed(&specs, config, seed)
        .with_context(|| format!("Failed to set up game {game_number}"))?;

    session
        .run_computers()
        .with_context(|| format!("Game {game_number} failed"))?;

    Ok(GameRecord {
        game_number,
        seed,
        scores: session.state().scores(),
        winners: session.winners(),
        plies: session.plies(),
    })
}

/// Compute aggregate statistics from game records
fn compute_statistics(games: Vec<GameRecord>, players: usize) -> MatchResults {
    let mut wins = vec![0; players];
    for game in &games {
        for &seat in &game.winners {
            if let Some(count) = wins.get_mut(seat) {
                *count += 1;
            }
        }
    }
    let shared_wins = games.iter().filter(|g| g.winners.len() > 1).count();

    let total = games.len();
    let (avg_plies, avg_fish) = if total == 0 {
        (0.0, 0.0)
    } else {
        let plies: usize = games.iter().map(|g| g.plies).sum();
        let fish: u32 = games.iter().map(|g| g.scores.iter().sum::<u32>()).sum();
        (plies as f32 / total as f32, fish as f32 / total as f32)
    };

    MatchResults {
        total_games: total,
        wins,
        shared_wins,
        avg_plies,
        avg_fish,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Seed of the first game; later games add their index
fn base_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| ChaCha8Rng::from_entropy().gen())
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    match serde_json::to_string_pretty(results) {
        Ok(json) => println!("{}", json),
        Err(err) => tracing::error!("Failed to serialize results: {err}"),
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.total_games;

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    for (seat, &count) in results.wins.iter().enumerate() {
        println!("Seat {} wins: {} ({:.1}%)", seat, count, percent(count, total));
    }
    println!("Shared wins: {}", results.shared_wins);
    println!("Avg moves:   {:.1}", results.avg_plies);
    println!("Avg fish:    {:.1}", results.avg_fish);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {} (seed {}): scores {:?}, winners {:?}, {} moves",
            game.game_number, game.seed, game.scores, game.winners, game.plies
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
