//! Error kinds for game actions

use thiserror::Error;

use crate::board::Coord;
use crate::game::Phase;

/// Why an action was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum IllegalAction {
    #[error("no token at {0}")]
    NoToken(Coord),

    #[error("token at {at} belongs to player {owner}")]
    NotOwnToken { at: Coord, owner: usize },

    #[error("{to} is not reachable from {from}")]
    Unreachable { from: Coord, to: Coord },

    #[error("no tile at {0}")]
    NoTile(Coord),

    #[error("{0} is already occupied")]
    Occupied(Coord),
}

/// Errors returned by the game core
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Rejected move or placement; the state is unchanged
    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalAction),

    /// Removing a tile that is not there. Unreachable in correct code.
    #[error("no tile to remove at {0}")]
    InvalidRemoval(Coord),

    #[error("{action} is not allowed during the {phase:?} phase")]
    PhaseViolation { action: &'static str, phase: Phase },

    #[error("invalid setup: {0}")]
    InvalidSetup(String),
}
