//! Live game session: owns the current state and drives computer turns
//!
//! The session holds one `GameState` value and replaces it wholesale after
//! every accepted action. Searches only ever see a borrowed snapshot.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ai::{choose_placement, AlphaBetaAI};
use crate::board::Coord;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::{GameState, Move, Phase, PlayerSpec};
use crate::movegen::legal_moves;
use crate::turn::{create_game, winners};

/// Moves kept in the session history
pub const HISTORY_LEN: usize = 10;

/// One applied move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub player: usize,
    pub mv: Move,
    pub fish: u8,
}

/// What a computer player did on its turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Place(Coord),
    Move(MoveRecord),
}

pub struct Session {
    state: GameState,
    ai: AlphaBetaAI,
    rng: ChaCha8Rng,
    history: VecDeque<MoveRecord>,
    plies: usize,
}

impl Session {
    /// New game with an entropy-seeded board
    pub fn new(specs: &[PlayerSpec], config: &GameConfig) -> Result<Self, GameError> {
        Self::with_rng(specs, config, ChaCha8Rng::from_entropy())
    }

    /// New game with a reproducible board and placement choices
    pub fn with_seed(specs: &[PlayerSpec], config: &GameConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(specs, config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(specs: &[PlayerSpec], config: &GameConfig, mut rng: ChaCha8Rng) -> Result<Self, GameError> {
        let state = create_game(specs, config, &mut rng)?;
        tracing::info!(
            players = state.player_count(),
            tiles = state.board().tile_count(),
            quota = state.quota(),
            "new game"
        );
        Ok(Self {
            state,
            ai: AlphaBetaAI::from_config(&config.search),
            rng,
            history: VecDeque::with_capacity(HISTORY_LEN),
            plies: 0,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Most recent moves, oldest first
    pub fn history(&self) -> impl Iterator<Item = &MoveRecord> {
        self.history.iter()
    }

    /// Moves played so far
    pub fn plies(&self) -> usize {
        self.plies
    }

    pub fn is_over(&self) -> bool {
        self.state.phase() == Phase::Over
    }

    pub fn winners(&self) -> Vec<usize> {
        winners(&self.state)
    }

    /// Computer controls the player to act
    pub fn computer_to_act(&self) -> bool {
        !self.is_over()
            && self
                .state
                .player(self.state.current_player())
                .is_some_and(|p| p.is_computer)
    }

    /// Destinations for one of the current player's tokens. Empty for
    /// empty cells and other players' tokens.
    pub fn destinations(&self, from: Coord) -> Vec<Coord> {
        if self.state.phase() != Phase::Playing || self.state.occupant(from) != Some(self.state.current_player()) {
            return Vec::new();
        }
        legal_moves(&self.state, from)
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Place a penguin for the player to act
    pub fn place(&mut self, at: Coord) -> Result<(), GameError> {
        let player = self.state.current_player();
        self.state = self.state.place_token(at)?;
        tracing::debug!(player, %at, "penguin placed");
        if self.state.phase() == Phase::Playing {
            tracing::info!("placement complete");
        }
        self.log_if_over();
        Ok(())
    }

    /// Move a penguin for the player to act
    pub fn play(&mut self, mv: Move) -> Result<MoveRecord, GameError> {
        let player = self.state.current_player();
        let fish = self.state.fish_gained(mv).unwrap_or(0);
        self.state = self.state.apply_move(mv)?;

        let record = MoveRecord { player, mv, fish };
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(record);
        self.plies += 1;

        tracing::debug!(player, from = %mv.from, to = %mv.to, fish, "move played");
        self.log_if_over();
        Ok(record)
    }

    /// Let the computer act if it is its turn. None when a human is to act
    /// or the game is over.
    pub fn step_computer(&mut self) -> Result<Option<Action>, GameError> {
        if !self.computer_to_act() {
            return Ok(None);
        }

        match self.state.phase() {
            Phase::Placing => match choose_placement(&self.state, &mut self.rng) {
                Some(at) => {
                    self.place(at)?;
                    Ok(Some(Action::Place(at)))
                }
                None => Ok(None),
            },
            Phase::Playing => match self.ai.best_move(&self.state)? {
                Some(mv) => self.play(mv).map(|record| Some(Action::Move(record))),
                None => Ok(None),
            },
            Phase::Setup | Phase::Over => Ok(None),
        }
    }

    /// Run computer turns until a human must act or the game ends
    pub fn run_computers(&mut self) -> Result<Vec<Action>, GameError> {
        let mut actions = Vec::new();
        while let Some(action) = self.step_computer()? {
            actions.push(action);
        }
        Ok(actions)
    }

    fn log_if_over(&self) {
        if self.is_over() {
            tracing::info!(scores = ?self.state.scores(), winners = ?self.winners(), "game over");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn computers(n: u8) -> Vec<PlayerSpec> {
        (0..n).map(PlayerSpec::computer).collect()
    }

    fn small_config() -> GameConfig {
        GameConfig::default().with_board(5, 6).with_depth(2)
    }

    #[test]
    fn test_computer_game_runs_to_completion() {
        let mut session = Session::with_seed(&computers(2), &small_config(), 11).unwrap();
        let actions = session.run_computers().unwrap();

        assert!(session.is_over());
        let placements = actions.iter().filter(|a| matches!(a, Action::Place(_))).count();
        assert_eq!(placements, 8);
        assert!(session.history().count() <= HISTORY_LEN);

        let total: u32 = session.state().scores().iter().sum();
        let fish: u32 = actions
            .iter()
            .filter_map(|a| match a {
                Action::Move(record) => Some(u32::from(record.fish)),
                Action::Place(_) => None,
            })
            .sum();
        assert_eq!(total, fish);
        assert!(!session.winners().is_empty());
    }

    #[test]
    fn test_tokens_stay_disjoint_and_counted() {
        let mut session = Session::with_seed(&computers(3), &small_config(), 5).unwrap();
        while session.step_computer().unwrap().is_some() {
            let state = session.state();
            let mut seen = HashSet::new();
            for player in state.players() {
                for token in &player.tokens {
                    assert!(seen.insert(*token), "token {token} shared");
                    assert_eq!(state.occupant(*token), Some(player.index));
                    assert!(state.board().contains(*token));
                }
            }
            assert_eq!(seen.len(), state.tokens_placed());
            if state.phase() != Phase::Placing {
                assert!(state.players().iter().all(|p| p.tokens.len() == state.quota()));
            }
        }
        assert!(session.is_over());
    }

    #[test]
    fn test_invalid_config_rejected_at_creation() {
        let config = small_config().with_depth(0);
        assert!(matches!(
            Session::with_seed(&computers(2), &config, 1),
            Err(GameError::InvalidSetup(_))
        ));
    }

    #[test]
    fn test_human_turn_stops_computer() {
        let specs = vec![PlayerSpec::human(0), PlayerSpec::computer(1)];
        let mut session = Session::with_seed(&specs, &small_config(), 2).unwrap();
        assert!(!session.computer_to_act());
        assert_eq!(session.step_computer().unwrap(), None);

        let free = session
            .state()
            .board()
            .sorted_tiles()
            .into_iter()
            .map(|(c, _)| c)
            .find(|c| !session.state().is_occupied(*c))
            .unwrap();
        session.place(free).unwrap();
        assert!(session.computer_to_act());
        let actions = session.run_computers().unwrap();
        assert_eq!(actions.len(), 1);
        assert!(!session.computer_to_act());
    }

    #[test]
    fn test_rejected_move_keeps_state() {
        let specs = vec![PlayerSpec::human(0), PlayerSpec::human(1)];
        let mut session = Session::with_seed(&specs, &small_config(), 9).unwrap();
        let before = session.state().clone();
        let bogus = Move::new(Coord::new(0, 0), Coord::new(0, 1));
        assert!(matches!(session.play(bogus), Err(GameError::PhaseViolation { .. })));
        assert_eq!(session.state(), &before);
        assert_eq!(session.plies(), 0);
    }

    #[test]
    fn test_destinations_only_for_own_tokens() {
        let mut session = Session::with_seed(&computers(2), &small_config(), 4).unwrap();
        while session.state().phase() == Phase::Placing {
            session.step_computer().unwrap();
        }
        let state = session.state().clone();
        let current = state.current_player();
        let other = (current + 1) % 2;
        let own = state.players()[current].tokens[0];
        let theirs = state.players()[other].tokens[0];
        assert_eq!(session.destinations(own), legal_moves(&state, own));
        assert!(session.destinations(theirs).is_empty());
    }
}
