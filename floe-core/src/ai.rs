//! CPU-based Alpha-Beta AI

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::Coord;
use crate::config::SearchConfig;
use crate::error::GameError;
use crate::eval::{evaluate, Heuristics};
use crate::game::{GameState, Move, Phase};
use crate::movegen::player_moves;
use crate::transposition::{Bound, Entry, StateKey, TranspositionTable};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Placement picks among this many best unoccupied tiles
const PLACEMENT_CANDIDATES: usize = 3;

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Counters from the most recent search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub evaluations: u64,
    pub table_hits: u64,
    pub cutoffs: u64,
    /// Positions held in the table when the search finished
    pub table_entries: usize,
}

/// Alpha-Beta AI player.
///
/// Maximizes at the searching player's plies and minimizes at every other
/// player's plies. With three or four players this treats all opponents as
/// one coordinated adversary, which is an approximation of true N-player
/// search kept on purpose.
pub struct AlphaBetaAI {
    pub depth: u32,
    pub heuristics: Heuristics,
    pub memoize: bool,
    table: TranspositionTable,
    stats: SearchStats,
}

impl AlphaBetaAI {
    pub fn new(depth: u32, heuristics: Heuristics) -> Self {
        Self {
            depth,
            heuristics,
            memoize: true,
            table: TranspositionTable::new(),
            stats: SearchStats::default(),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.depth, config.heuristics.clone()).with_memoization(config.memoize)
    }

    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Statistics of the last `best_move` call
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Best move for the player to move, searched to `self.depth` plies
    /// (at least one). None when that player cannot move.
    pub fn best_move(&mut self, state: &GameState) -> Result<Option<Move>, GameError> {
        self.table.clear();
        debug_assert!(self.table.is_empty());
        self.stats = SearchStats::default();

        if state.phase() != Phase::Playing {
            return Ok(None);
        }

        let perspective = state.current_player();
        let moves = player_moves(state, perspective);
        if moves.is_empty() {
            return Ok(None);
        }

        let depth = self.depth.max(1);
        let mut alpha = f32::NEG_INFINITY;
        let mut best: Option<(Move, f32)> = None;

        for mv in moves {
            let child = state.play_unchecked(mv)?;
            let score = self.minimax(&child, depth - 1, alpha, f32::INFINITY, perspective)?;

            // Strict comparison keeps the first of equally scored moves
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        self.stats.table_hits = self.table.hits();
        self.stats.table_entries = self.table.len();
        tracing::debug!(
            player = perspective,
            depth,
            nodes = self.stats.nodes,
            evaluations = self.stats.evaluations,
            table_hits = self.stats.table_hits,
            cutoffs = self.stats.cutoffs,
            table_entries = self.stats.table_entries,
            "search finished"
        );

        Ok(best.map(|(mv, _)| mv))
    }

    /// Evaluate a position from `perspective`'s point of view
    pub fn evaluate(&self, state: &GameState, perspective: usize) -> f32 {
        evaluate(state, perspective, &self.heuristics)
    }

    // ========================================================================
    // MINIMAX WITH ALPHA-BETA
    // ========================================================================

    fn minimax(
        &mut self,
        state: &GameState,
        depth: u32,
        mut alpha: f32,
        mut beta: f32,
        perspective: usize,
    ) -> Result<f32, GameError> {
        self.stats.nodes += 1;

        // Phase is Over exactly when no player can move
        if depth == 0 || state.phase() == Phase::Over {
            self.stats.evaluations += 1;
            return Ok(evaluate(state, perspective, &self.heuristics));
        }

        let key = self.memoize.then(|| StateKey::of(state));
        if let Some(entry) = key.as_ref().and_then(|k| self.table.probe(k, depth)) {
            match entry.bound {
                Bound::Exact => return Ok(entry.value),
                Bound::Lower => alpha = alpha.max(entry.value),
                Bound::Upper => beta = beta.min(entry.value),
            }
            if alpha >= beta {
                return Ok(entry.value);
            }
        }
        let (alpha_in, beta_in) = (alpha, beta);

        let mover = state.current_player();
        let moves = player_moves(state, mover);
        if moves.is_empty() {
            self.stats.evaluations += 1;
            return Ok(evaluate(state, perspective, &self.heuristics));
        }

        let maximizing = mover == perspective;
        let mut best = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };

        for mv in moves {
            let child = state.play_unchecked(mv)?;
            let score = self.minimax(&child, depth - 1, alpha, beta, perspective)?;

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        if let Some(key) = key {
            self.table.store(key, Entry::classify(best, depth, alpha_in, beta_in));
        }
        Ok(best)
    }
}

/// Search `depth` plies with default heuristics and memoization
pub fn compute_ai_move(state: &GameState, depth: u32) -> Result<Option<Move>, GameError> {
    AlphaBetaAI::new(depth, Heuristics::default()).best_move(state)
}

// ============================================================================
// PLACEMENT
// ============================================================================

/// Pick a placement tile: a random choice among the unoccupied tiles with
/// the most fish. None when no tile is free.
pub fn choose_placement<R: Rng>(state: &GameState, rng: &mut R) -> Option<Coord> {
    let mut free: Vec<(u8, Coord)> = state
        .board()
        .tiles()
        .filter(|(coord, _)| !state.is_occupied(*coord))
        .map(|(coord, tile)| (tile.fish, coord))
        .collect();

    // Most fish first, then coordinate order for a stable candidate list
    free.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    free.truncate(PLACEMENT_CANDIDATES);
    free.choose(rng).map(|&(_, coord)| coord)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::game::PlayerSpec;
    use crate::movegen::legal_moves;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn specs() -> Vec<PlayerSpec> {
        vec![PlayerSpec::computer(0), PlayerSpec::human(1)]
    }

    fn simple_game() -> GameState {
        GameState::from_placements(
            Board::filled(4, 5, 2),
            &specs(),
            &[
                vec![Coord::new(0, 0), Coord::new(3, 4)],
                vec![Coord::new(1, 2), Coord::new(2, 0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ai_returns_legal_move() {
        let game = simple_game();
        let mut ai = AlphaBetaAI::new(2, Heuristics::default());
        let mv = ai.best_move(&game).unwrap().unwrap();
        assert_eq!(game.occupant(mv.from), Some(game.current_player()));
        assert!(legal_moves(&game, mv.from).contains(&mv.to));
        assert!(ai.last_stats().nodes > 0);
    }

    #[test]
    fn test_search_does_not_touch_input() {
        let game = simple_game();
        let before = game.clone();
        let mut ai = AlphaBetaAI::new(3, Heuristics::default());
        ai.best_move(&game).unwrap();
        assert_eq!(game, before);
    }

    #[test]
    fn test_depth_one_takes_the_richest_tile() {
        // Player 0 stands on a 3 and can only leave it; player 1 waits
        let board = Board::from_tiles(
            2,
            6,
            [
                (Coord::new(0, 0), 1),
                (Coord::new(0, 1), 1),
                (Coord::new(0, 3), 3),
                (Coord::new(0, 4), 1),
                (Coord::new(1, 5), 2),
                (Coord::new(0, 5), 2),
            ],
        )
        .unwrap();
        let game = GameState::from_placements(
            board,
            &specs(),
            &[vec![Coord::new(0, 0), Coord::new(0, 3)], vec![Coord::new(1, 5)]],
        )
        .unwrap();

        let mut ai = AlphaBetaAI::new(1, Heuristics::material_only());
        let mv = ai.best_move(&game).unwrap().unwrap();
        assert_eq!(mv.from, Coord::new(0, 3));
        assert_eq!(game.fish_gained(mv), Some(3));
    }

    #[test]
    fn test_depth_one_never_prefers_lower_gain() {
        let game = simple_game();
        let mut ai = AlphaBetaAI::new(1, Heuristics::material_only());
        let mv = ai.best_move(&game).unwrap().unwrap();
        let best_gain = player_moves(&game, 0)
            .iter()
            .filter_map(|m| game.fish_gained(*m))
            .max()
            .unwrap();
        assert_eq!(game.fish_gained(mv), Some(best_gain));
    }

    #[test]
    fn test_memoization_does_not_change_choice() {
        let game = simple_game();
        let mut with_table = AlphaBetaAI::new(3, Heuristics::default());
        let mut without_table = AlphaBetaAI::new(3, Heuristics::default()).with_memoization(false);
        assert_eq!(
            with_table.best_move(&game).unwrap(),
            without_table.best_move(&game).unwrap()
        );
    }

    #[test]
    fn test_reused_ai_starts_each_search_fresh() {
        let config = crate::config::GameConfig::default().with_board(4, 5);
        let mut reused = AlphaBetaAI::new(3, Heuristics::default());
        let mut searched = 0;

        for seed in 0..6 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut state = crate::turn::create_game(&specs(), &config, &mut rng).unwrap();
            while state.phase() == Phase::Placing {
                let at = choose_placement(&state, &mut rng).unwrap();
                state = state.place_token(at).unwrap();
            }
            if state.phase() != Phase::Playing {
                continue;
            }

            let mut fresh = AlphaBetaAI::new(3, Heuristics::default());
            let expected = fresh.best_move(&state).unwrap();
            assert_eq!(reused.best_move(&state).unwrap(), expected);
            assert_eq!(compute_ai_move(&state, 3).unwrap(), expected);
            assert_eq!(reused.last_stats(), fresh.last_stats());

            // Same position again: a table kept from the last call would add hits
            reused.best_move(&state).unwrap();
            assert_eq!(reused.last_stats(), fresh.last_stats());
            searched += 1;
        }
        assert!(searched > 0);
    }

    #[test]
    fn test_search_is_deterministic() {
        let game = simple_game();
        let first = compute_ai_move(&game, 3).unwrap();
        let second = compute_ai_move(&game, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_none_when_game_over() {
        let board = Board::from_tiles(2, 6, [(Coord::new(0, 0), 1), (Coord::new(1, 5), 1)]).unwrap();
        let game = GameState::from_placements(
            board,
            &specs(),
            &[vec![Coord::new(0, 0)], vec![Coord::new(1, 5)]],
        )
        .unwrap();
        assert_eq!(game.phase(), Phase::Over);
        assert_eq!(compute_ai_move(&game, 3).unwrap(), None);
    }

    #[test]
    fn test_three_player_search_returns_move() {
        let game = GameState::from_placements(
            Board::filled(4, 6, 1),
            &[PlayerSpec::computer(0), PlayerSpec::computer(1), PlayerSpec::computer(2)],
            &[vec![Coord::new(0, 0)], vec![Coord::new(3, 5)], vec![Coord::new(2, 2)]],
        )
        .unwrap();
        assert!(compute_ai_move(&game, 3).unwrap().is_some());
    }

    #[test]
    fn test_placement_prefers_rich_tiles() {
        let board = Board::from_tiles(
            2,
            4,
            [
                (Coord::new(0, 0), 1),
                (Coord::new(0, 1), 3),
                (Coord::new(0, 2), 3),
                (Coord::new(0, 3), 1),
                (Coord::new(1, 0), 2),
                (Coord::new(1, 1), 1),
            ],
        )
        .unwrap();
        let state = GameState::setup(board, &specs());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let at = choose_placement(&state, &mut rng).unwrap();
            assert!([Coord::new(0, 1), Coord::new(0, 2), Coord::new(1, 0)].contains(&at));
        }
    }
}
