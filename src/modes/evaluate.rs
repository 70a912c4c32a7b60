//! Evaluation mode for watching a trained policy
//!
//! Loads a policy (the one given, or the newest in the brain directory),
//! disables exploration and runs the simulation for a fixed number of ticks.
//! Meals and deaths are printed as they happen.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::agents::Event;
use crate::rl::{latest_policy, load_policy};
use crate::sim::{Scoreboard, Simulation, SimulationConfig, StepObserver, TickReport};
use crate::world::GridWorld;

/// Configuration for evaluation mode
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    pub sim_config: SimulationConfig,

    /// Policy to evaluate; the newest file in `brain_dir` when `None`
    pub policy: Option<PathBuf>,

    pub brain_dir: PathBuf,

    /// Number of ticks to run
    pub ticks: u64,

    /// Pause between ticks
    pub tick_delay: Duration,
}

impl EvaluateConfig {
    pub fn new(sim_config: SimulationConfig) -> Self {
        Self {
            sim_config,
            policy: None,
            brain_dir: PathBuf::from("resources/brain"),
            ticks: 1000,
            tick_delay: Duration::ZERO,
        }
    }
}

/// Policy file to evaluate: the explicit one, else the newest in `brain_dir`
pub fn resolve_policy(explicit: Option<&Path>, brain_dir: &Path) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| latest_policy(brain_dir))
}

/// Prints terminal events as they happen
struct EventPrinter;

impl StepObserver for EventPrinter {
    fn on_tick(&mut self, _world: &GridWorld, report: &TickReport) {
        for event in &report.events {
            match event {
                Event::Consumed { .. } => println!(
                    "[Tick {}] Carrot eaten! (Carrots: {}, Deaths: {})",
                    report.tick, report.scoreboard.learner_wins, report.scoreboard.pursuer_wins
                ),
                Event::Caught { .. } => println!(
                    "[Tick {}] Caught by hunter! (Carrots: {}, Deaths: {})",
                    report.tick, report.scoreboard.learner_wins, report.scoreboard.pursuer_wins
                ),
            }
        }
    }
}

/// Evaluation mode
pub struct EvaluateMode {
    sim: Simulation,
    config: EvaluateConfig,
    policy_path: Option<PathBuf>,
}

impl EvaluateMode {
    pub fn new(config: EvaluateConfig) -> Result<Self> {
        let policy_path = resolve_policy(config.policy.as_deref(), &config.brain_dir);
        let brain = match &policy_path {
            Some(path) => load_policy(path, config.sim_config.fresh_learner()),
            None => {
                warn!(dir = ?config.brain_dir, "No trained policy found, evaluating an empty table");
                config.sim_config.fresh_learner()
            }
        };

        let mut sim = Simulation::populated(&config.sim_config, brain).with_context(|| {
            format!("Failed to set up world from {:?}", config.sim_config.map_path)
        })?;
        sim.set_epsilon(0.0);
        sim.add_observer(Box::new(EventPrinter));

        Ok(Self {
            sim,
            config,
            policy_path,
        })
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Run the configured number of ticks or until Ctrl+C
    pub async fn run(&mut self) -> Result<Scoreboard> {
        match &self.policy_path {
            Some(path) => println!("Evaluating policy: {:?}", path),
            None => println!("Evaluating an untrained policy"),
        }
        println!("Ticks: {} | Exploration disabled\n", self.config.ticks);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        while self.sim.tick() < self.config.ticks {
            tokio::select! {
                biased;
                _ = &mut ctrl_c => {
                    println!("\nEvaluation interrupted");
                    break;
                }
                _ = super::pace(self.config.tick_delay) => {
                    self.sim.step().context("Simulation tick failed")?;
                }
            }
        }

        let score = self.sim.scoreboard();
        println!("\n{}", "=".repeat(70));
        println!(
            "Ticks: {} | Carrots: {} | Deaths: {}",
            self.sim.tick(),
            score.learner_wins,
            score.pursuer_wins
        );
        println!("{}", self.sim.metrics().stats().format_summary());
        println!("{}", "=".repeat(70));

        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{QLearner, QLearningConfig, State, save_policy};
    use crate::world::Direction;
    use tempfile::TempDir;

    const ROOM: &str = "XXXXXXX\nX.....X\nX.....X\nX.....X\nXXXXXXX\n";

    fn test_config(temp_dir: &TempDir) -> EvaluateConfig {
        let map = temp_dir.path().join("world.txt");
        std::fs::write(&map, ROOM).unwrap();

        let mut config = EvaluateConfig::new(SimulationConfig {
            seed: Some(5),
            ..SimulationConfig::new(map)
        });
        config.brain_dir = temp_dir.path().join("brain");
        config.ticks = 50;
        config
    }

    #[test]
    fn test_resolve_policy_prefers_explicit() {
        let temp_dir = TempDir::new().unwrap();
        let explicit = temp_dir.path().join("mine.json");
        assert_eq!(
            resolve_policy(Some(&explicit), temp_dir.path()),
            Some(explicit)
        );
        assert_eq!(resolve_policy(None, &temp_dir.path().join("empty")), None);
    }

    #[test]
    fn test_exploration_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mode = EvaluateMode::new(config).unwrap();
        let learner = mode.simulation().learner().unwrap();
        assert_eq!(learner.brain().epsilon(), 0.0);
        assert!(learner.brain().is_empty());
    }

    #[test]
    fn test_picks_up_latest_policy() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let mut table = QLearner::new(QLearningConfig::default());
        let state = State {
            walls: [true; 8],
            pursuer: (0, 0),
            target: (1, -1),
        };
        table.set_utility(state, Direction::Up, 3.5);
        save_policy(&table, &config.brain_dir.join("learner_policy_a.json")).unwrap();

        let mode = EvaluateMode::new(config).unwrap();
        let brain = mode.simulation().learner().unwrap().brain();
        assert_eq!(brain.len(), 1);
        assert_eq!(brain.get_utility(&state, Direction::Up), 3.5);
        assert_eq!(brain.epsilon(), 0.0);
    }

    #[tokio::test]
    async fn test_runs_requested_ticks() {
        let temp_dir = TempDir::new().unwrap();
        let mut mode = EvaluateMode::new(test_config(&temp_dir)).unwrap();
        let score = mode.run().await.unwrap();
        assert_eq!(mode.simulation().tick(), 50);
        assert_eq!(score, mode.simulation().scoreboard());
    }
}
