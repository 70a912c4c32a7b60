//! A* search used by the pursuer to chase the learner

pub mod astar;
pub mod maze;

pub use astar::{find_path, manhattan, next_step};
pub use maze::Maze;
