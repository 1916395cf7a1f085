//! Play command - an interactive game at the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: game_loop()
//! - Level 3: human_turn(), report_computer_actions()
//! - Level 4: input parsing and board rendering

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use floe_core::{Action, Coord, GameState, Move, Phase, PlayerSpec, Session};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Configuration JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of human players
    #[arg(long, default_value = "1")]
    pub humans: usize,

    /// Number of computer players
    #[arg(long, default_value = "1")]
    pub computers: usize,

    /// Search depth (overrides the config file)
    #[arg(long)]
    pub depth: Option<u32>,
}

/// One line of player input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Place(Coord),
    Move(Move),
    /// List destinations for a token
    Hint(Coord),
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let players = args.humans + args.computers;
    if !(2..=4).contains(&players) {
        bail!("a game needs 2 to 4 players, got {}", players);
    }
    let config = crate::load_config(args.config.as_deref(), args.depth)?;

    let specs: Vec<PlayerSpec> = (0..players as u8)
        .map(|color| {
            if (color as usize) < args.humans {
                PlayerSpec::human(color)
            } else {
                PlayerSpec::computer(color)
            }
        })
        .collect();

    let mut session = match seed {
        Some(seed) => Session::with_seed(&specs, &config, seed),
        None => Session::new(&specs, &config),
    }
    .context("Failed to start game")?;

    print_help();
    let stdin = io::stdin();
    game_loop(&mut session, &mut stdin.lock())?;

    print_board(session.state());
    print_final(&session);
    Ok(())
}

// ============================================================================
// LEVEL 2 - GAME LOOP
// ============================================================================

fn game_loop(session: &mut Session, input: &mut impl BufRead) -> Result<()> {
    while !session.is_over() {
        let actions = session.run_computers().context("Computer turn failed")?;
        report_computer_actions(&actions);
        if session.is_over() {
            break;
        }
        if !human_turn(session, input)? {
            tracing::info!("Game abandoned");
            break;
        }
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - TURNS
// ============================================================================

/// Prompt until the human makes a legal action. False on quit or end of input.
fn human_turn(session: &mut Session, input: &mut impl BufRead) -> Result<bool> {
    print_board(session.state());
    let player = session.state().current_player();

    loop {
        let verb = match session.state().phase() {
            Phase::Placing => "place",
            _ => "move",
        };
        print!("{} to {}> ", player_label(player), verb);
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let outcome = match command {
            Command::Quit => return Ok(false),
            Command::Hint(at) => {
                let targets: Vec<String> = session.destinations(at).iter().map(Coord::to_string).collect();
                if targets.is_empty() {
                    println!("No moves from {at}");
                } else {
                    println!("From {at}: {}", targets.join(" "));
                }
                continue;
            }
            Command::Place(at) => session.place(at).map(|_| format!("Placed at {at}")),
            Command::Move(mv) => session
                .play(mv)
                .map(|record| format!("{} -> {} for {} fish", mv.from, mv.to, record.fish)),
        };

        match outcome {
            Ok(message) => {
                println!("{message}");
                return Ok(true);
            }
            Err(err) => println!("Rejected: {err}"),
        }
    }
}

fn report_computer_actions(actions: &[Action]) {
    for action in actions {
        match action {
            Action::Place(at) => println!("Computer placed at {at}"),
            Action::Move(record) => println!(
                "{} moved {} -> {} for {} fish",
                player_label(record.player),
                record.mv.from,
                record.mv.to,
                record.fish
            ),
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Parse "r c" (place), "r c r c" (move), "? r c" (hint) or "q"
fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Ok(Command::Quit);
    }
    if let Some(rest) = line.strip_prefix('?') {
        return match parse_numbers(rest)?.as_slice() {
            [r, c] => Ok(Command::Hint(Coord::new(*r, *c))),
            _ => bail!("usage: ? ROW COL"),
        };
    }
    match parse_numbers(line)?.as_slice() {
        [r, c] => Ok(Command::Place(Coord::new(*r, *c))),
        [r1, c1, r2, c2] => Ok(Command::Move(Move::new(Coord::new(*r1, *c1), Coord::new(*r2, *c2)))),
        _ => bail!("enter ROW COL to place, ROW COL ROW COL to move, ? ROW COL for hints, q to quit"),
    }
}

fn parse_numbers(text: &str) -> Result<Vec<i32>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i32>().with_context(|| format!("not a number: {s}")))
        .collect()
}

fn player_label(index: usize) -> String {
    format!("Player {}", (b'A' + index as u8) as char)
}

fn print_help() {
    println!("Commands: ROW COL to place, ROW COL ROW COL to move, ? ROW COL for hints, q to quit");
}

/// Render the board: fish counts, player letters on occupied tiles, '.' for
/// holes. Odd columns sit half a row lower.
fn render_board(state: &GameState) -> String {
    let board = state.board();
    let mut out = String::from("    ");
    for col in 0..board.cols() {
        out.push_str(&format!("{col:>3}"));
    }
    out.push('\n');

    for row in 0..board.rows() {
        for odd in [false, true] {
            if odd {
                out.push_str("    ");
            } else {
                out.push_str(&format!("{row:>3} "));
            }
            for col in 0..board.cols() {
                if (col % 2 == 1) != odd {
                    out.push_str("   ");
                    continue;
                }
                let coord = Coord::new(row, col);
                let cell = match (state.occupant(coord), board.tile_at(coord)) {
                    (Some(player), _) => format!("{}", (b'A' + player as u8) as char),
                    (None, Some(tile)) => tile.fish.to_string(),
                    (None, None) => ".".to_string(),
                };
                out.push_str(&format!("{cell:>3}"));
            }
            out.push('\n');
        }
    }
    out
}

fn print_board(state: &GameState) {
    println!("\n{}", render_board(state));
    for player in state.players() {
        println!("{}: {} fish", player_label(player.index), player.score);
    }
}

fn print_final(session: &Session) {
    let winners = session.winners();
    if !session.is_over() {
        println!("Game not finished");
    } else if winners.len() == 1 {
        println!("{} wins!", player_label(winners[0]));
    } else {
        let names: Vec<String> = winners.iter().map(|&w| player_label(w)).collect();
        println!("Tie between {}", names.join(", "));
    }
}

// ============================================================================
// TESTS
// ============================================================================
