//! FLOE Core - Game engine and AI
//!
//! This crate provides the core game logic for FLOE, a penguin sliding game
//! for two to four players:
//! - Board geometry (hex grid with column-offset coordinates)
//! - Game state, sliding move generation and turn rotation
//! - Position evaluation with mobility and positional heuristics
//! - CPU-based alpha-beta AI with a transposition table
//! - A session driver for presentation layers

pub mod board;
pub mod error;
pub mod game;
pub mod movegen;
pub mod turn;
pub mod eval;
pub mod transposition;
pub mod ai;
pub mod config;
pub mod session;

// Re-exports for convenient access
pub use board::{Board, Coord, Direction, Tile};
pub use error::{GameError, IllegalAction};
pub use game::{penguin_quota, GameState, Move, Phase, Player, PlayerSpec};
pub use movegen::{has_any_legal_move, is_terminal, legal_moves, mobility, player_moves};
pub use turn::{create_game, winners};
pub use eval::{evaluate, Heuristics};
pub use ai::{choose_placement, compute_ai_move, AlphaBetaAI, SearchStats};
pub use config::{GameConfig, SearchConfig};
pub use session::{Action, MoveRecord, Session};
