//! Memo table for the alpha-beta search

use rustc_hash::FxHashMap;

use crate::board::Coord;
use crate::game::GameState;

/// Canonical signature of a position: everything evaluation depends on
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    tiles: Vec<(Coord, u8)>,
    occupants: Vec<(Coord, usize)>,
    scores: Vec<u32>,
    mover: usize,
}

impl StateKey {
    pub fn of(state: &GameState) -> Self {
        Self {
            tiles: state
                .board()
                .sorted_tiles()
                .into_iter()
                .map(|(coord, tile)| (coord, tile.fish))
                .collect(),
            occupants: state.sorted_occupants(),
            scores: state.scores(),
            mover: state.current_player(),
        }
    }
}

/// How a stored value relates to the true minimax value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// True value is at least the stored one (search failed high)
    Lower,
    /// True value is at most the stored one (search failed low)
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry {
    pub value: f32,
    /// Remaining depth the value was searched to
    pub depth: u32,
    pub bound: Bound,
}

impl Entry {
    /// Classify a result against the window it was searched with
    pub fn classify(value: f32, depth: u32, alpha: f32, beta: f32) -> Self {
        let bound = if value <= alpha {
            Bound::Upper
        } else if value >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        Self { value, depth, bound }
    }
}

/// Position -> searched value
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<StateKey, Entry>,
    hits: u64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry searched at least as deep as `depth`
    pub fn probe(&mut self, key: &StateKey, depth: u32) -> Option<Entry> {
        let entry = self.entries.get(key).filter(|e| e.depth >= depth).copied();
        if entry.is_some() {
            self.hits += 1;
        }
        entry
    }

    /// Store, keeping the deeper of two entries for the same key
    pub fn store(&mut self, key: StateKey, entry: Entry) {
        match self.entries.get(&key) {
            Some(existing) if existing.depth > entry.depth => {}
            _ => {
                self.entries.insert(key, entry);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::game::{Move, PlayerSpec};

    fn game() -> GameState {
        GameState::from_placements(
            Board::filled(3, 4, 2),
            &[PlayerSpec::human(0), PlayerSpec::human(1)],
            &[vec![Coord::new(0, 0)], vec![Coord::new(2, 3)]],
        )
        .unwrap()
    }

    #[test]
    fn test_key_distinguishes_scores_and_mover() {
        let state = game();
        let scored = state.clone().with_score(0, 1);
        assert_ne!(StateKey::of(&state), StateKey::of(&scored));

        let moved = state.apply_move(Move::new(Coord::new(0, 0), Coord::new(0, 1))).unwrap();
        assert_ne!(StateKey::of(&state), StateKey::of(&moved));
        assert_eq!(StateKey::of(&state), StateKey::of(&state.clone()));
    }

    #[test]
    fn test_probe_respects_depth() {
        let mut table = TranspositionTable::new();
        let key = StateKey::of(&game());
        table.store(key.clone(), Entry { value: 1.0, depth: 2, bound: Bound::Exact });

        assert!(table.probe(&key, 3).is_none());
        assert_eq!(table.probe(&key, 2).map(|e| e.value), Some(1.0));
        assert_eq!(table.hits(), 1);
    }

    #[test]
    fn test_shallower_store_does_not_replace() {
        let mut table = TranspositionTable::new();
        let key = StateKey::of(&game());
        table.store(key.clone(), Entry { value: 5.0, depth: 3, bound: Bound::Exact });
        table.store(key.clone(), Entry { value: -1.0, depth: 1, bound: Bound::Exact });
        assert_eq!(table.probe(&key, 1).map(|e| e.value), Some(5.0));

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.hits(), 0);
    }

    #[test]
    fn test_classify_bounds() {
        assert_eq!(Entry::classify(0.0, 1, 0.0, 5.0).bound, Bound::Upper);
        assert_eq!(Entry::classify(5.0, 1, 0.0, 5.0).bound, Bound::Lower);
        assert_eq!(Entry::classify(2.5, 1, 0.0, 5.0).bound, Bound::Exact);
    }
}
