//! Simulation stepper and its configuration
//!
//! [`Simulation`] drives every registered agent once per tick, in
//! registration order, then notifies observers with a [`TickReport`].

pub mod config;
pub mod observer;
pub mod simulation;

pub use config::{RewardConfig, SimulationConfig};
pub use observer::{Scoreboard, StepObserver, TickReport};
pub use simulation::{Placement, Simulation};
