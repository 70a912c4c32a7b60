//! Escape Bunny - a predator/prey grid simulation with a learning prey
//!
//! This library provides:
//! - The grid substrate with occupancy tracking (world module)
//! - Target, A* pursuer and Q-learning prey agents (agents, pathfinding modules)
//! - Tabular Q-learning with JSON policy persistence (rl module)
//! - Outcome series and rolling statistics (metrics module)
//! - The simulation stepper and its observers (sim module)
//! - Headless train and evaluate loops (modes module)

pub mod agents;
pub mod metrics;
pub mod modes;
pub mod pathfinding;
pub mod rl;
pub mod sim;
pub mod world;
