//! Game state and core types

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Coord};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Penguins per player: 4 for two players, 3 for three, 2 for four
pub fn penguin_quota(player_count: usize) -> usize {
    6usize.saturating_sub(player_count)
}

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Placing,
    Playing,
    Over,
}

/// How a seat is configured before the game starts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub is_computer: bool,
    pub color_id: u8,
    /// Youngest player is seated first when ages are known
    pub age: Option<u32>,
}

impl PlayerSpec {
    pub fn human(color_id: u8) -> Self {
        Self { is_computer: false, color_id, age: None }
    }

    pub fn computer(color_id: u8) -> Self {
        Self { is_computer: true, color_id, age: None }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }
}

/// A seated player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub index: usize,
    pub color_id: u8,
    pub is_computer: bool,
    pub age: Option<u32>,
    pub score: u32,
    /// Token positions in placement order
    pub tokens: Vec<Coord>,
}

/// A sliding move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
}

impl Move {
    pub const fn new(from: Coord, to: Coord) -> Self {
        Self { from, to }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone to mutate; actions return a new value)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub(crate) board: Board,

    /// Occupied cell -> owning player
    pub(crate) occupants: FxHashMap<Coord, usize>,

    pub(crate) players: Vec<Player>,

    /// Player to act
    pub(crate) current: usize,

    pub(crate) phase: Phase,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Seat the players on a board. Seats are ordered youngest first when
    /// ages are given; the sort is stable so equal or unknown ages keep the
    /// order of `specs`.
    pub fn setup(board: Board, specs: &[PlayerSpec]) -> Self {
        let mut ordered = specs.to_vec();
        ordered.sort_by_key(|spec| spec.age.unwrap_or(u32::MAX));

        let players = ordered
            .into_iter()
            .enumerate()
            .map(|(index, spec)| Player {
                index,
                color_id: spec.color_id,
                is_computer: spec.is_computer,
                age: spec.age,
                score: 0,
                tokens: Vec::new(),
            })
            .collect();

        Self {
            board,
            occupants: FxHashMap::default(),
            players,
            current: 0,
            phase: Phase::Setup,
        }
    }

    /// Override a player's score (synthetic positions)
    pub fn with_score(mut self, player: usize, score: u32) -> Self {
        if let Some(p) = self.players.get_mut(player) {
            p.score = score;
        }
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the player to act
    pub fn current_player(&self) -> usize {
        self.current
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn quota(&self) -> usize {
        penguin_quota(self.players.len())
    }

    pub fn scores(&self) -> Vec<u32> {
        self.players.iter().map(|p| p.score).collect()
    }

    /// Owner of the token on `coord`, if any
    pub fn occupant(&self, coord: Coord) -> Option<usize> {
        self.occupants.get(&coord).copied()
    }

    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.occupants.contains_key(&coord)
    }

    /// Occupied cells sorted by coordinate
    pub fn sorted_occupants(&self) -> Vec<(Coord, usize)> {
        let mut occupants: Vec<_> = self.occupants.iter().map(|(&c, &p)| (c, p)).collect();
        occupants.sort_unstable();
        occupants
    }

    pub fn tokens_placed(&self) -> usize {
        self.occupants.len()
    }

    /// Fish collected by `mv`: the value of the tile being left
    pub fn fish_gained(&self, mv: Move) -> Option<u8> {
        self.board.tile_at(mv.from).map(|tile| tile.fish)
    }

    // ========================================================================
    // INTERNAL MUTATION (callers hold a private copy)
    // ========================================================================

    pub(crate) fn put_token(&mut self, player: usize, at: Coord) {
        self.occupants.insert(at, player);
        self.players[player].tokens.push(at);
    }

    /// Relocate a token, keeping its slot in the owner's token list
    pub(crate) fn relocate_token(&mut self, player: usize, from: Coord, to: Coord) {
        self.occupants.remove(&from);
        self.occupants.insert(to, player);
        if let Some(slot) = self.players[player].tokens.iter_mut().find(|t| **t == from) {
            *slot = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota() {
        assert_eq!(penguin_quota(2), 4);
        assert_eq!(penguin_quota(3), 3);
        assert_eq!(penguin_quota(4), 2);
    }

    #[test]
    fn test_setup_orders_youngest_first() {
        let specs = [
            PlayerSpec::human(0).with_age(30),
            PlayerSpec::computer(1).with_age(8),
            PlayerSpec::human(2),
        ];
        let state = GameState::setup(Board::filled(3, 3, 1), &specs);
        assert_eq!(state.phase(), Phase::Setup);
        let colors: Vec<_> = state.players().iter().map(|p| p.color_id).collect();
        assert_eq!(colors, vec![1, 0, 2]);
        for (i, p) in state.players().iter().enumerate() {
            assert_eq!(p.index, i);
        }
        assert!(state.players()[0].is_computer);
    }

    #[test]
    fn test_setup_keeps_order_without_ages() {
        let specs = [PlayerSpec::computer(5), PlayerSpec::human(3)];
        let state = GameState::setup(Board::filled(2, 2, 1), &specs);
        assert_eq!(state.players()[0].color_id, 5);
        assert_eq!(state.players()[1].color_id, 3);
    }

    #[test]
    fn test_relocate_keeps_token_slot() {
        let specs = [PlayerSpec::human(0), PlayerSpec::human(1)];
        let mut state = GameState::setup(Board::filled(3, 3, 2), &specs);
        state.put_token(0, Coord::new(0, 0));
        state.put_token(0, Coord::new(2, 2));
        state.relocate_token(0, Coord::new(0, 0), Coord::new(1, 1));
        assert_eq!(state.players()[0].tokens, vec![Coord::new(1, 1), Coord::new(2, 2)]);
        assert_eq!(state.occupant(Coord::new(1, 1)), Some(0));
        assert_eq!(state.occupant(Coord::new(0, 0)), None);
    }

    #[test]
    fn test_fish_gained_reads_origin_tile() {
        let board = Board::from_tiles(1, 2, [(Coord::new(0, 0), 3), (Coord::new(0, 1), 1)]).unwrap();
        let state = GameState::setup(board, &[PlayerSpec::human(0), PlayerSpec::human(1)]);
        let mv = Move::new(Coord::new(0, 0), Coord::new(0, 1));
        assert_eq!(state.fish_gained(mv), Some(3));
    }
}
