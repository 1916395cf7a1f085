//! Sliding move generation and terminal detection

use crate::board::{Coord, Direction};
use crate::game::{GameState, Move};

/// Legal destinations for the token on `from`.
///
/// Walks each direction label one step at a time. A hole or the board edge
/// ends the line; a token of any player ends it without being included.
/// Order: direction (E, NE, NW, W, SW, SE), then distance.
pub fn legal_moves(state: &GameState, from: Coord) -> Vec<Coord> {
    let mut destinations = Vec::new();
    for dir in Direction::ALL {
        walk_direction(state, from, dir, |dest| {
            if !destinations.contains(&dest) {
                destinations.push(dest);
            }
        });
    }
    destinations
}

/// Every move available to `player`, token by token
pub fn player_moves(state: &GameState, player: usize) -> Vec<Move> {
    let Some(p) = state.player(player) else {
        return Vec::new();
    };
    p.tokens
        .iter()
        .flat_map(|&from| legal_moves(state, from).into_iter().map(move |to| Move::new(from, to)))
        .collect()
}

/// True if any of `player`'s tokens can move
pub fn has_any_legal_move(state: &GameState, player: usize) -> bool {
    state
        .player(player)
        .is_some_and(|p| p.tokens.iter().any(|&t| can_move(state, t)))
}

/// Number of destinations across all of `player`'s tokens (mobility heuristic)
pub fn mobility(state: &GameState, player: usize) -> usize {
    state
        .player(player)
        .map(|p| p.tokens.iter().map(|&t| legal_moves(state, t).len()).sum())
        .unwrap_or(0)
}

/// No player can move. Turn order plays no part.
pub fn is_terminal(state: &GameState) -> bool {
    (0..state.player_count()).all(|player| !has_any_legal_move(state, player))
}

// ============================================================================
// HELPERS
// ============================================================================

fn walk_direction(state: &GameState, from: Coord, dir: Direction, mut visit: impl FnMut(Coord)) {
    let mut current = from;
    loop {
        current = current.neighbor(dir);
        if !is_open(state, current) {
            break;
        }
        visit(current);
    }
}

fn can_move(state: &GameState, from: Coord) -> bool {
    Direction::ALL.iter().any(|&dir| is_open(state, from.neighbor(dir)))
}

/// A cell a token may pass over or land on
fn is_open(state: &GameState, coord: Coord) -> bool {
    state.board().contains(coord) && !state.is_occupied(coord)
}
