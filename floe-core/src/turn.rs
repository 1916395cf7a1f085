//! Turn engine: placement, move application and turn rotation

use rand::Rng;

use crate::board::{Board, Coord};
use crate::config::GameConfig;
use crate::error::{GameError, IllegalAction};
use crate::game::{penguin_quota, GameState, Move, Phase, PlayerSpec, MAX_PLAYERS, MIN_PLAYERS};
use crate::movegen::{has_any_legal_move, legal_moves};

/// Start a new game on a freshly generated board, ready for placement
pub fn create_game<R: Rng>(
    specs: &[PlayerSpec],
    config: &GameConfig,
    rng: &mut R,
) -> Result<GameState, GameError> {
    check_player_count(specs.len())?;
    config
        .validate()
        .map_err(|err| GameError::InvalidSetup(err.to_string()))?;
    let board = Board::generate(config.rows, config.cols, config.hole_probability, rng);
    let needed = specs.len() * penguin_quota(specs.len());
    if board.tile_count() < needed {
        return Err(GameError::InvalidSetup(format!(
            "board has {} tiles but {} penguins must be placed",
            board.tile_count(),
            needed
        )));
    }
    let mut state = GameState::setup(board, specs);
    state.phase = Phase::Placing;
    Ok(state)
}

/// Winning players: every player holding the maximum score
pub fn winners(state: &GameState) -> Vec<usize> {
    let best = state.players().iter().map(|p| p.score).max().unwrap_or(0);
    state
        .players()
        .iter()
        .filter(|p| p.score == best)
        .map(|p| p.index)
        .collect()
}

impl GameState {
    /// Position already in play: `placements[i]` are player i's tokens.
    /// The quota is not enforced so small synthetic positions can be built.
    pub fn from_placements(
        board: Board,
        specs: &[PlayerSpec],
        placements: &[Vec<Coord>],
    ) -> Result<Self, GameError> {
        check_player_count(specs.len())?;
        if placements.len() != specs.len() {
            return Err(GameError::InvalidSetup(format!(
                "{} placement lists for {} players",
                placements.len(),
                specs.len()
            )));
        }

        let mut state = GameState::setup(board, specs);
        for (player, tokens) in placements.iter().enumerate() {
            for &at in tokens {
                state.check_free_tile(at)?;
                state.put_token(player, at);
            }
        }
        state.phase = Phase::Playing;
        state.settle_turn(0);
        Ok(state)
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Place a penguin for the current player on an empty tile
    pub fn place_token(&self, at: Coord) -> Result<GameState, GameError> {
        self.expect_phase(Phase::Placing, "placing a penguin")?;
        self.check_free_tile(at)?;

        let mut next = self.clone();
        next.put_token(self.current, at);

        if next.tokens_placed() >= next.player_count() * next.quota() {
            next.phase = Phase::Playing;
            next.settle_turn(0);
            tracing::debug!("all penguins placed, play begins with player {}", next.current);
        } else {
            next.current = (self.current + 1) % self.player_count();
        }
        Ok(next)
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Validate and apply a move for the current player
    pub fn apply_move(&self, mv: Move) -> Result<GameState, GameError> {
        self.expect_phase(Phase::Playing, "moving a penguin")?;

        match self.occupant(mv.from) {
            None => return Err(IllegalAction::NoToken(mv.from).into()),
            Some(owner) if owner != self.current => {
                return Err(IllegalAction::NotOwnToken { at: mv.from, owner }.into());
            }
            Some(_) => {}
        }
        if !legal_moves(self, mv.from).contains(&mv.to) {
            return Err(IllegalAction::Unreachable { from: mv.from, to: mv.to }.into());
        }

        self.play_unchecked(mv)
    }

    /// Apply a move already known to be legal (generated by the move
    /// generator for the current player)
    pub(crate) fn play_unchecked(&self, mv: Move) -> Result<GameState, GameError> {
        let mut next = self.clone();
        let mover = self.current;

        let fish = next.board.remove_tile(mv.from)?;
        next.players[mover].score += u32::from(fish);
        next.relocate_token(mover, mv.from, mv.to);

        next.settle_turn((mover + 1) % next.player_count());
        Ok(next)
    }

    // ========================================================================
    // TURN ROTATION
    // ========================================================================

    /// Hand the turn to the first player, starting at `start` and going
    /// round once, who can move. Nobody can: the game is over.
    fn settle_turn(&mut self, start: usize) {
        let count = self.player_count();
        let movable = (0..count)
            .map(|offset| (start + offset) % count)
            .find(|&player| has_any_legal_move(self, player));

        match movable {
            Some(player) => self.current = player,
            None => {
                self.current = start;
                self.phase = Phase::Over;
            }
        }
    }

    // ========================================================================
    // VALIDATION HELPERS
    // ========================================================================

    fn expect_phase(&self, phase: Phase, action: &'static str) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::PhaseViolation { action, phase: self.phase })
        }
    }

    fn check_free_tile(&self, at: Coord) -> Result<(), GameError> {
        if !self.board.contains(at) {
            return Err(IllegalAction::NoTile(at).into());
        }
        if self.is_occupied(at) {
            return Err(IllegalAction::Occupied(at).into());
        }
        Ok(())
    }
}

fn check_player_count(count: usize) -> Result<(), GameError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
        Ok(())
    } else {
        Err(GameError::InvalidSetup(format!(
            "{count} players; the game needs {MIN_PLAYERS} to {MAX_PLAYERS}"
        )))
    }
}
