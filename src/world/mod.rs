//! Grid substrate for the simulation
//!
//! Holds walls, per-cell occupant lists and the registry of agent positions.
//! It has no knowledge of agent behavior; agents in [`crate::agents`] drive it.

pub mod direction;
pub mod error;
pub mod grid;

pub use direction::{Direction, Neighborhood};
pub use error::WorldError;
pub use grid::{Cell, GridWorld, Position, WALL_CHAR, map_dimensions, read_map};
