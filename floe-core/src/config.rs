//! Configuration types for game setup and computer play

use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::eval::Heuristics;

/// Largest supported board dimension
pub const MAX_DIMENSION: i32 = 32;
/// Deepest supported search
pub const MAX_DEPTH: u32 = 8;

/// Computer player configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched per move
    pub depth: u32,
    /// Cache searched positions within one move decision
    pub memoize: bool,
    /// Evaluation weights
    pub heuristics: Heuristics,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            memoize: true,
            heuristics: Heuristics::default(),
        }
    }
}

/// Game configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: i32,
    pub cols: i32,
    /// Chance that a generated cell is a hole
    pub hole_probability: f64,
    pub search: SearchConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 8,
            hole_probability: 0.1,
            search: SearchConfig::default(),
        }
    }
}

impl GameConfig {
    /// Set board dimensions
    pub fn with_board(mut self, rows: i32, cols: i32) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Set search depth
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.search.depth = depth;
        self
    }

    /// Set hole probability
    pub fn with_hole_probability(mut self, probability: f64) -> Self {
        self.hole_probability = probability;
        self
    }

    /// Check ranges
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_DIMENSION).contains(&self.rows) || !(1..=MAX_DIMENSION).contains(&self.cols) {
            bail!(
                "board must be between 1x1 and {MAX_DIMENSION}x{MAX_DIMENSION}, got {}x{}",
                self.rows,
                self.cols
            );
        }
        if !(0.0..1.0).contains(&self.hole_probability) {
            bail!("hole_probability must be in [0, 1), got {}", self.hole_probability);
        }
        if !(1..=MAX_DEPTH).contains(&self.search.depth) {
            bail!("search depth must be between 1 and {MAX_DEPTH}, got {}", self.search.depth);
        }
        let h = &self.search.heuristics;
        if !(0.0..=1.0).contains(&h.mobility_weight) {
            bail!("mobility_weight must be in [0, 1], got {}", h.mobility_weight);
        }
        if !(0.0..=0.1).contains(&h.positional_weight) {
            bail!("positional_weight must be in [0, 0.1], got {}", h.positional_weight);
        }
        Ok(())
    }

    /// Load from JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
