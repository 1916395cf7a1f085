//! Hex board geometry with column-offset coordinates

use std::fmt;

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Lowest fish value a tile can carry
pub const MIN_FISH: u8 = 1;
/// Highest fish value a tile can carry
pub const MAX_FISH: u8 = 3;

/// Offset hex coordinates (row, col)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Neighbor in the given direction. May be off the board.
    pub fn neighbor(&self, direction: Direction) -> Coord {
        let (dr, dc) = direction.delta(self.col);
        Coord::new(self.row + dr, self.col + dc)
    }

    /// Offset-space distance |dr| + |dc|
    pub fn offset_distance(&self, other: Coord) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The six sliding directions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    E,
    NE,
    NW,
    W,
    SW,
    SE,
}

impl Direction {
    /// All directions in walk order
    pub const ALL: [Direction; 6] = [
        Direction::E,
        Direction::NE,
        Direction::NW,
        Direction::W,
        Direction::SW,
        Direction::SE,
    ];

    /// (dr, dc) for a step from a cell in the given column.
    /// Looked up per step: the numeric delta changes with column parity.
    pub fn delta(self, col: i32) -> (i32, i32) {
        let table = if col.rem_euclid(2) == 0 { &EVEN_COL_DELTAS } else { &ODD_COL_DELTAS };
        table[self as usize]
    }
}

/// Direction deltas for even columns, indexed by `Direction as usize`
const EVEN_COL_DELTAS: [(i32, i32); 6] = [
    (0, 1),   // E
    (-1, 1),  // NE
    (-1, 0),  // NW
    (0, -1),  // W
    (1, 0),   // SW
    (1, 1),   // SE
];

/// Direction deltas for odd columns
const ODD_COL_DELTAS: [(i32, i32); 6] = [
    (0, 1),   // E
    (-1, 0),  // NE
    (-1, -1), // NW
    (0, -1),  // W
    (1, -1),  // SW
    (1, 0),   // SE
];

/// A present ice tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub fish: u8,
}

/// Tile storage for a rows x cols board. Missing keys are holes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: i32,
    cols: i32,
    tiles: FxHashMap<Coord, Tile>,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Random board: each cell is a hole with `hole_probability`, otherwise
    /// it gets a uniform fish value in 1..=3.
    pub fn generate<R: Rng>(rows: i32, cols: i32, hole_probability: f64, rng: &mut R) -> Self {
        let mut tiles = FxHashMap::default();
        for row in 0..rows {
            for col in 0..cols {
                if rng.gen::<f64>() < hole_probability {
                    continue;
                }
                let fish = rng.gen_range(MIN_FISH..=MAX_FISH);
                tiles.insert(Coord::new(row, col), Tile { fish });
            }
        }
        Self { rows, cols, tiles }
    }

    /// Board with every cell present and carrying `fish`
    pub fn filled(rows: i32, cols: i32, fish: u8) -> Self {
        let tiles = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Coord::new(row, col)))
            .map(|coord| (coord, Tile { fish }))
            .collect();
        Self { rows, cols, tiles }
    }

    /// Board from explicit (coord, fish) pairs
    pub fn from_tiles(
        rows: i32,
        cols: i32,
        tiles: impl IntoIterator<Item = (Coord, u8)>,
    ) -> Result<Self, GameError> {
        let mut board = Self { rows, cols, tiles: FxHashMap::default() };
        for (coord, fish) in tiles {
            if !board.in_bounds(coord) {
                return Err(GameError::InvalidSetup(format!(
                    "tile {coord} lies outside a {rows}x{cols} board"
                )));
            }
            board.tiles.insert(coord, Tile { fish });
        }
        Ok(board)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        (0..self.rows).contains(&coord.row) && (0..self.cols).contains(&coord.col)
    }

    pub fn tile_at(&self, coord: Coord) -> Option<Tile> {
        self.tiles.get(&coord).copied()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterate present tiles (arbitrary order)
    pub fn tiles(&self) -> impl Iterator<Item = (Coord, Tile)> + '_ {
        self.tiles.iter().map(|(&coord, &tile)| (coord, tile))
    }

    /// Present tiles sorted by coordinate
    pub fn sorted_tiles(&self) -> Vec<(Coord, Tile)> {
        let mut tiles: Vec<_> = self.tiles().collect();
        tiles.sort_unstable_by_key(|&(coord, _)| coord);
        tiles
    }

    /// Neighbors that still hold a tile, labeled by direction
    pub fn neighbors(&self, coord: Coord) -> Vec<(Direction, Coord)> {
        Direction::ALL
            .iter()
            .map(|&dir| (dir, coord.neighbor(dir)))
            .filter(|(_, n)| self.contains(*n))
            .collect()
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Remove the tile at `coord`, returning its fish value
    pub fn remove_tile(&mut self, coord: Coord) -> Result<u8, GameError> {
        self.tiles
            .remove(&coord)
            .map(|tile| tile.fish)
            .ok_or(GameError::InvalidRemoval(coord))
    }

    /// Put back a tile removed by `remove_tile` with its exact value
    pub fn restore_tile(&mut self, coord: Coord, fish: u8) {
        debug_assert!(self.in_bounds(coord), "restoring {coord} outside the board");
        self.tiles.insert(coord, Tile { fish });
    }
}
