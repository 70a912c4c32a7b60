//! Tabular reinforcement learning for the prey
//!
//! Provides:
//! - Discrete state encoding of the learner's surroundings
//! - A sparse Q-table with epsilon-greedy selection and Bellman updates
//! - JSON persistence of the learned table

pub mod config;
pub mod observation;
pub mod persistence;
pub mod qtable;

pub use config::QLearningConfig;
pub use observation::{State, observe};
pub use persistence::{
    PolicyEntry, PolicyFile, latest_policy, load_policy, read_policy, save_policy,
    timestamped_policy_path,
};
pub use qtable::QLearner;
