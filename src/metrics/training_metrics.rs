//! Outcome series recorded for an external plotting tool
//!
//! Three parallel series are kept for the whole run:
//! - `outcomes`: one entry per life, 1 when the target was eaten, 0 when caught
//! - `episode_rewards`: summed reward of each episode that ended in a death
//! - `steps_to_target`: ticks taken for each meal

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use super::TrainingStats;

/// How a life segment ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The learner ate the target
    Consumed,
    /// The learner was caught by a pursuer
    Died,
}

/// Raw series as written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub outcomes: Vec<u8>,
    pub episode_rewards: Vec<f64>,
    pub steps_to_target: Vec<u64>,
}

/// Accumulates per-life reward and steps and turns outcomes into series
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    series: MetricsSnapshot,
    life_reward: f64,
    life_steps: u64,
    stats: TrainingStats,
}

impl TrainingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one acting tick and its reward towards the current life
    pub fn update_step(&mut self, reward: f64) {
        self.life_reward += reward;
        self.life_steps += 1;
    }

    /// Close the current life segment
    ///
    /// A meal resets the step counter only; the episode reward keeps
    /// accumulating until the learner dies.
    pub fn record_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Consumed => {
                self.series.outcomes.push(1);
                self.series.steps_to_target.push(self.life_steps);
                self.stats.record_consumption(self.life_steps);
                self.life_steps = 0;
            }
            Outcome::Died => {
                self.series.outcomes.push(0);
                self.series.episode_rewards.push(self.life_reward);
                self.stats.record_death(self.life_reward);
                self.life_reward = 0.0;
                self.life_steps = 0;
            }
        }
    }

    pub fn outcomes(&self) -> &[u8] {
        &self.series.outcomes
    }

    pub fn episode_rewards(&self) -> &[f64] {
        &self.series.episode_rewards
    }

    pub fn steps_to_target(&self) -> &[u64] {
        &self.series.steps_to_target
    }

    /// Reward accumulated in the episode still in progress
    pub fn current_reward(&self) -> f64 {
        self.life_reward
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    /// Success rate after each life, averaged over it and up to `window` lives before it
    pub fn rolling_success_rate(&self, window: usize) -> Vec<f64> {
        let outcomes = &self.series.outcomes;
        (0..outcomes.len())
            .map(|i| {
                let chunk = &outcomes[i.saturating_sub(window)..=i];
                chunk.iter().map(|o| f64::from(*o)).sum::<f64>() / chunk.len() as f64
            })
            .collect()
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.series
    }

    /// Write the series to `<dir>/metrics_<YYYYmmdd-HHMMSS>.json`
    ///
    /// Creates `dir` if needed and returns the written path.
    pub fn save_snapshot(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {:?}", dir))?;

        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("metrics_{timestamp}.json"));
        let json =
            serde_json::to_string_pretty(&self.series).context("Failed to serialize metrics")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write metrics to {:?}", path))?;

        info!(path = ?path, lives = self.series.outcomes.len(), "Metrics snapshot saved");
        Ok(path)
    }
}
