//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::Coord;
use crate::game::GameState;
use crate::movegen::mobility;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Weight for mobility (legal destination count), at most 1.0
    pub mobility_weight: f32,
    /// Weight for nearby unclaimed fish, at most 0.1
    pub positional_weight: f32,
    /// Offset distance within which tiles count toward the positional term
    pub positional_radius: u32,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            mobility_weight: 0.5,
            positional_weight: 0.1,
            positional_radius: 3,
        }
    }
}

impl Heuristics {
    /// Score difference only
    pub fn material_only() -> Self {
        Self {
            mobility_weight: 0.0,
            positional_weight: 0.0,
            positional_radius: 0,
        }
    }
}

/// Evaluate position from `perspective`'s point of view:
/// own score minus the mean opponent score, plus weighted mobility and
/// positional terms.
pub fn evaluate(state: &GameState, perspective: usize, heuristics: &Heuristics) -> f32 {
    let opponents = state.player_count().saturating_sub(1).max(1) as f32;

    let mut own_score = 0.0f32;
    let mut opp_score = 0.0f32;
    for player in state.players() {
        if player.index == perspective {
            own_score = player.score as f32;
        } else {
            opp_score += player.score as f32;
        }
    }
    let mut score = own_score - opp_score / opponents;

    if heuristics.mobility_weight.abs() > 0.001 {
        let mut own_mobility = 0.0f32;
        let mut opp_mobility = 0.0f32;
        for player in 0..state.player_count() {
            let m = mobility(state, player) as f32;
            if player == perspective {
                own_mobility = m;
            } else {
                opp_mobility += m;
            }
        }
        score += heuristics.mobility_weight * (own_mobility - opp_mobility / opponents);
    }

    if heuristics.positional_weight.abs() > 0.001 {
        score += heuristics.positional_weight * positional_value(state, perspective, heuristics.positional_radius);
    }

    score
}

/// Sum of fish / (distance + 1) over unoccupied tiles within `radius` of
/// each of the player's tokens
pub fn positional_value(state: &GameState, player: usize, radius: u32) -> f32 {
    let Some(p) = state.player(player) else {
        return 0.0;
    };
    let tokens: &[Coord] = &p.tokens;

    let mut value = 0.0f32;
    for (coord, tile) in state.board().tiles() {
        if state.is_occupied(coord) {
            continue;
        }
        for token in tokens {
            let distance = token.offset_distance(coord);
            if distance <= radius {
                value += tile.fish as f32 / (distance + 1) as f32;
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::game::PlayerSpec;

    fn mirrored_game() -> GameState {
        GameState::from_placements(
            Board::filled(3, 4, 2),
            &[PlayerSpec::human(0), PlayerSpec::computer(1)],
            &[vec![Coord::new(0, 0)], vec![Coord::new(2, 3)]],
        )
        .unwrap()
    }

    #[test]
    fn test_score_difference_dominates_material_only() {
        let state = mirrored_game().with_score(0, 7).with_score(1, 3);
        let h = Heuristics::material_only();
        assert_eq!(evaluate(&state, 0, &h), 4.0);
        assert_eq!(evaluate(&state, 1, &h), -4.0);
    }

    #[test]
    fn test_mean_of_opponents() {
        let state = GameState::from_placements(
            Board::filled(3, 6, 1),
            &[PlayerSpec::human(0), PlayerSpec::human(1), PlayerSpec::human(2)],
            &[vec![Coord::new(0, 0)], vec![Coord::new(2, 5)], vec![Coord::new(1, 3)]],
        )
        .unwrap()
        .with_score(0, 5)
        .with_score(1, 2)
        .with_score(2, 4);
        let h = Heuristics::material_only();
        assert_eq!(evaluate(&state, 0, &h), 2.0);
    }

    #[test]
    fn test_mobility_term_rewards_freedom() {
        let state = mirrored_game();
        let h = Heuristics { positional_weight: 0.0, ..Heuristics::default() };
        let expected = 0.5 * (mobility(&state, 0) as f32 - mobility(&state, 1) as f32);
        assert!((evaluate(&state, 0, &h) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_positional_counts_nearby_unoccupied_tiles() {
        let board = Board::from_tiles(
            1,
            6,
            [(Coord::new(0, 0), 1), (Coord::new(0, 1), 3), (Coord::new(0, 5), 3)],
        )
        .unwrap();
        let state = GameState::from_placements(
            board,
            &[PlayerSpec::human(0), PlayerSpec::human(1)],
            &[vec![Coord::new(0, 0)], vec![Coord::new(0, 5)]],
        )
        .unwrap();
        // Only (0,1) is free and within radius 3 of (0,0): 3 / 2
        assert!((positional_value(&state, 0, 3) - 1.5).abs() < 1e-5);
        assert_eq!(positional_value(&state, 1, 3), 0.0);
    }

    #[test]
    fn test_default_heuristics_within_bounds() {
        let h = Heuristics::default();
        assert!(h.mobility_weight <= 1.0);
        assert!(h.positional_weight <= 0.1);
    }
}
