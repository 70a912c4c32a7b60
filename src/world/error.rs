use std::path::PathBuf;

use thiserror::Error;

use super::grid::Position;
use crate::agents::AgentId;

/// Fatal configuration problems raised while building or mutating a world
#[derive(Debug, Error)]
pub enum WorldError {
    /// No map was supplied, or the file does not exist
    #[error("map file not found: {0:?}")]
    MapMissing(PathBuf),

    #[error("failed to read map file {path:?}")]
    MapUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The map text contained no rows
    #[error("map contains no rows")]
    EmptyMap,

    /// Every cell is a wall or already occupied
    #[error("no free cell available after {attempts} spawn attempts")]
    NoFreeCell { attempts: usize },

    #[error("agent {0:?} is not registered with this world")]
    UnknownAgent(AgentId),

    #[error("position {0:?} is outside the world")]
    OutOfBounds(Position),

    /// An agent was asked to stand on a wall
    #[error("position {0:?} is a wall")]
    Wall(Position),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
