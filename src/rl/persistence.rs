//! Policy persistence for saving and loading a learned Q-table
//!
//! The table is written as pretty JSON: a version tag, the action set, and one
//! entry per stored (state, action) pair. Loading is forgiving: a missing or
//! unreadable file yields an empty table and a warning, never an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{QLearner, QLearningConfig, State};
use crate::world::Direction;

/// One stored utility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub state: State,
    pub action: Direction,
    pub utility: f64,
}

/// On-disk form of a Q-table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyFile {
    /// Crate version that wrote the file
    pub version: String,

    /// Action set the table was learned over
    pub actions: Vec<Direction>,

    pub entries: Vec<PolicyEntry>,
}

impl PolicyFile {
    pub fn from_learner(learner: &QLearner) -> Self {
        let mut entries: Vec<PolicyEntry> = learner
            .entries()
            .map(|(state, action, utility)| PolicyEntry {
                state: *state,
                action,
                utility,
            })
            .collect();
        entries.sort_by(|a, b| (a.state, a.action).cmp(&(b.state, b.action)));

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            actions: learner.actions().to_vec(),
            entries,
        }
    }

    pub fn into_learner(self, config: QLearningConfig) -> QLearner {
        let actions = if self.actions.is_empty() {
            Direction::CARDINAL.to_vec()
        } else {
            self.actions
        };
        let mut learner = QLearner::with_actions(config, actions);
        for entry in self.entries {
            learner.set_utility(entry.state, entry.action, entry.utility);
        }
        learner
    }
}

/// Save a Q-table to `path`
///
/// Creates parent directories if they don't exist.
pub fn save_policy(learner: &QLearner, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let file = PolicyFile::from_learner(learner);
    let json = serde_json::to_string_pretty(&file).context("Failed to serialize policy")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write policy to {:?}", path))?;

    info!(path = ?path, entries = learner.len(), "Policy saved");
    Ok(())
}

/// Read a Q-table, propagating any failure
pub fn read_policy(path: &Path, config: QLearningConfig) -> Result<QLearner> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read policy from {:?}", path))?;
    let file: PolicyFile =
        serde_json::from_str(&json).context("Failed to deserialize policy")?;
    Ok(file.into_learner(config))
}

/// Load a Q-table, falling back to `fallback` on any failure
///
/// A loaded table takes its learning parameters from `fallback` and its
/// action set from the file.
pub fn load_policy(path: &Path, fallback: QLearner) -> QLearner {
    if !path.exists() {
        warn!(path = ?path, "No saved policy found, starting with an empty table");
        return fallback;
    }

    match read_policy(path, fallback.config().clone()) {
        Ok(learner) => {
            info!(path = ?path, entries = learner.len(), "Policy loaded");
            learner
        }
        Err(err) => {
            let reason = format!("{err:#}");
            warn!(path = ?path, error = %reason, "Failed to load policy, starting with an empty table");
            fallback
        }
    }
}

/// `<dir>/learner_policy_<YYYYmmdd-HHMMSS>.json`
pub fn timestamped_policy_path(dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    dir.join(format!("learner_policy_{timestamp}.json"))
}

/// Most recently modified `.json` file in `dir`, if any
pub fn latest_policy(dir: &Path) -> Option<PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| {
            let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .max()
        .map(|(_, path)| path)
}
