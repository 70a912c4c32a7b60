//! Headless training loop for the Q-learning prey
//!
//! Runs the simulation tick by tick until the tick limit is reached or Ctrl+C
//! is pressed, printing progress along the way. On exit the learned table is
//! saved under a timestamped name together with a metrics snapshot.
//!
//! # Example
//!
//! ```rust,ignore
//! use escape_bunny::modes::{TrainConfig, TrainMode};
//! use escape_bunny::sim::SimulationConfig;
//!
//! let mut config = TrainConfig::new(SimulationConfig::default());
//! config.max_ticks = Some(100_000);
//! TrainMode::new(config)?.run().await?;
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::rl::{load_policy, save_policy, timestamped_policy_path};
use crate::sim::{Simulation, SimulationConfig};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Map, rewards and learning parameters
    pub sim_config: SimulationConfig,

    /// Policy to resume from; a fresh table is used when `None`
    pub resume_from: Option<PathBuf>,

    /// Directory the trained policy is written to
    pub brain_dir: PathBuf,

    /// Directory the metrics snapshot is written to
    pub data_dir: PathBuf,

    /// Stop after this many ticks; run until interrupted when `None`
    pub max_ticks: Option<u64>,

    /// Pause between ticks
    pub tick_delay: Duration,

    /// Print progress every N ticks
    pub log_frequency: u64,
}

impl TrainConfig {
    pub fn new(sim_config: SimulationConfig) -> Self {
        Self {
            sim_config,
            resume_from: None,
            brain_dir: PathBuf::from("resources/brain"),
            data_dir: PathBuf::from("resources/data"),
            max_ticks: None,
            tick_delay: Duration::ZERO,
            log_frequency: 500,
        }
    }
}

/// Training mode
///
/// Owns a populated [`Simulation`] and drives it headless.
pub struct TrainMode {
    sim: Simulation,
    config: TrainConfig,
}

impl TrainMode {
    /// Build the world, agents and policy described by `config`
    pub fn new(config: TrainConfig) -> Result<Self> {
        config
            .sim_config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid learning parameters")?;

        let brain = match &config.resume_from {
            Some(path) => load_policy(path, config.sim_config.fresh_learner()),
            None => config.sim_config.fresh_learner(),
        };
        let sim = Simulation::populated(&config.sim_config, brain).with_context(|| {
            format!("Failed to set up world from {:?}", config.sim_config.map_path)
        })?;

        Ok(Self { sim, config })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Run until the tick limit or Ctrl+C, then save
    ///
    /// Returns the path of the saved policy.
    pub async fn run(&mut self) -> Result<PathBuf> {
        self.print_header();

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        while !self.limit_reached() {
            tokio::select! {
                biased;
                _ = &mut ctrl_c => {
                    println!("\n\nStopping training...");
                    break;
                }
                _ = super::pace(self.config.tick_delay) => {
                    self.sim.step().context("Simulation tick failed")?;
                    let tick = self.sim.tick();
                    if tick % self.config.log_frequency.max(1) == 0 {
                        self.print_progress(tick);
                    }
                }
            }
        }

        println!("Saving progress...");
        let policy_path = self.save()?;

        println!("\nTraining complete!");
        println!("Policy saved to: {:?}", policy_path);
        println!("\nFinal Statistics:");
        println!("{}", self.sim.metrics().stats().format_summary());

        Ok(policy_path)
    }

    fn limit_reached(&self) -> bool {
        self.config
            .max_ticks
            .is_some_and(|limit| self.sim.tick() >= limit)
    }

    /// Write the policy and the metrics series
    fn save(&self) -> Result<PathBuf> {
        let policy_path = timestamped_policy_path(&self.config.brain_dir);
        if let Some(learner) = self.sim.learner() {
            save_policy(learner.brain(), &policy_path)
                .with_context(|| format!("Failed to save policy to {:?}", policy_path))?;
        }

        let metrics_path = self
            .sim
            .metrics()
            .save_snapshot(&self.config.data_dir)
            .with_context(|| format!("Failed to save metrics to {:?}", self.config.data_dir))?;
        println!("  Metrics saved: {:?}", metrics_path);

        Ok(policy_path)
    }

    fn print_header(&self) {
        let learning = &self.config.sim_config.learning;
        println!("{}", "=".repeat(70));
        println!("Q-learning Training - Escape Bunny");
        println!("{}", "=".repeat(70));
        println!("Map: {:?}", self.config.sim_config.map_path);
        println!(
            "World: {}x{} grid",
            self.sim.world().width(),
            self.sim.world().height()
        );
        match self.config.max_ticks {
            Some(limit) => println!("Ticks: {}", limit),
            None => println!("Ticks: until Ctrl+C"),
        }
        println!("Learning:");
        println!("  Alpha: {}", learning.alpha);
        println!("  Gamma: {}", learning.gamma);
        println!("  Epsilon: {}", learning.epsilon);
        if let Some(path) = &self.config.resume_from {
            println!("Resumed from: {:?}", path);
        }
        println!("Logging: Every {} ticks", self.config.log_frequency);
        println!("Brain dir: {:?}", self.config.brain_dir);
        println!("{}", "=".repeat(70));
        println!();
    }

    fn print_progress(&self, tick: u64) {
        let score = self.sim.scoreboard();
        println!(
            "[Tick {}] Carrots: {} | Deaths: {} | {}",
            tick,
            score.learner_wins,
            score.pursuer_wins,
            self.sim.metrics().stats().format_summary()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::read_policy;
    use std::time::Instant;
    use tempfile::TempDir;

    const ROOM: &str = "XXXXXXX\nX.....X\nX.....X\nX.....X\nXXXXXXX\n";

    fn test_config(temp_dir: &TempDir) -> TrainConfig {
        let map = temp_dir.path().join("world.txt");
        std::fs::write(&map, ROOM).unwrap();

        let mut config = TrainConfig::new(SimulationConfig {
            seed: Some(11),
            ..SimulationConfig::new(map)
        });
        config.brain_dir = temp_dir.path().join("brain");
        config.data_dir = temp_dir.path().join("data");
        config.max_ticks = Some(300);
        config
    }

    #[tokio::test]
    async fn test_zero_delay_runs_at_full_speed() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.max_ticks = Some(5000);
        config.log_frequency = 5000;
        let mut mode = TrainMode::new(config).unwrap();

        let start = Instant::now();
        mode.run().await.unwrap();
        assert_eq!(mode.simulation().tick(), 5000);
        // a 1 ms timer per tick alone would take over 5 s
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(SimulationConfig::default());
        assert_eq!(config.max_ticks, None);
        assert_eq!(config.tick_delay, Duration::ZERO);
        assert_eq!(config.brain_dir, PathBuf::from("resources/brain"));
    }

    #[test]
    fn test_invalid_learning_rate_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.sim_config.learning.alpha = 0.0;
        assert!(TrainMode::new(config).is_err());
    }

    #[test]
    fn test_missing_map_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        config.sim_config.map_path = temp_dir.path().join("missing.txt");
        assert!(TrainMode::new(config).is_err());
    }

    #[tokio::test]
    async fn test_run_saves_policy_and_metrics() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut mode = TrainMode::new(config.clone()).unwrap();

        let policy_path = mode.run().await.unwrap();
        assert_eq!(mode.simulation().tick(), 300);

        let policy = read_policy(&policy_path, config.sim_config.learning.clone()).unwrap();
        assert!(!policy.is_empty());

        let snapshots: Vec<_> = std::fs::read_dir(&config.data_dir).unwrap().collect();
        assert_eq!(snapshots.len(), 1);

        // resuming picks the table back up
        let mut resumed = config;
        resumed.resume_from = Some(policy_path);
        let mode = TrainMode::new(resumed).unwrap();
        assert_eq!(
            mode.simulation().learner().unwrap().brain().len(),
            policy.len()
        );
    }
}
