use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rl::{QLearner, QLearningConfig};
use crate::world::Neighborhood;

/// Reward schedule seen by the learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward for every acting tick (encourages short paths)
    pub move_reward: f64,
    /// Bonus for eating the target
    pub consume_reward: f64,
    /// Reward when caught by a pursuer
    pub caught_reward: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            move_reward: -1.0,
            consume_reward: 50.0,
            caught_reward: -100.0,
        }
    }
}

/// Configuration for one simulation session
///
/// Loaded once at startup and handed to the [`Simulation`](super::Simulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Map the live world is built from
    pub map_path: PathBuf,
    /// Map the pursuer plans over; defaults to `map_path`
    pub maze_path: Option<PathBuf>,
    /// Seed for all randomness; `None` seeds from the OS
    pub seed: Option<u64>,
    pub rewards: RewardConfig,
    pub learning: QLearningConfig,
    /// Moves offered to a freshly created learner
    pub neighborhood: Neighborhood,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from("resources/world.txt"),
            maze_path: None,
            seed: None,
            rewards: RewardConfig::default(),
            learning: QLearningConfig::default(),
            neighborhood: Neighborhood::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a configuration for the given map with default parameters
    pub fn new(map_path: impl Into<PathBuf>) -> Self {
        Self {
            map_path: map_path.into(),
            ..Default::default()
        }
    }

    /// Read a JSON configuration file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    pub fn maze_path(&self) -> &Path {
        self.maze_path.as_deref().unwrap_or(&self.map_path)
    }

    /// Empty Q-table over this configuration's moves
    pub fn fresh_learner(&self) -> QLearner {
        QLearner::with_actions(self.learning.clone(), self.neighborhood.directions().to_vec())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.learning.validate()
    }
}
