//! Agents that live on the grid
//!
//! Three kinds exist: a passive [`Target`] the prey wants to eat, a scripted
//! [`Pursuer`] that hunts the prey with A*, and the Q-learning [`Learner`].
//! Dispatch is a closed `match` over [`Agent`]; positions are owned by the
//! [`GridWorld`](crate::world::GridWorld), addressed by [`AgentId`].

pub mod learner;
pub mod pursuer;
pub mod target;

use rand::Rng;

pub use learner::Learner;
pub use pursuer::{Pursuer, PursuerMove};
pub use target::Target;

use crate::metrics::TrainingMetrics;
use crate::sim::RewardConfig;
use crate::world::GridWorld;

/// Handle of an agent registered with a world, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

/// Tag used by the world to answer "who is on this cell"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Target,
    Pursuer,
    Learner,
}

/// Terminal events produced during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// `learner` ate `target`, which was moved elsewhere
    Consumed { learner: AgentId, target: AgentId },
    /// `pursuer` caught `learner`; both were respawned
    Caught { learner: AgentId, pursuer: AgentId },
}

/// Everything an agent may touch while it updates
pub struct TickContext<'a, R: Rng> {
    pub world: &'a mut GridWorld,
    pub rng: &'a mut R,
    pub rewards: &'a RewardConfig,
    pub metrics: &'a mut TrainingMetrics,
    pub events: &'a mut Vec<Event>,
}

/// A registered agent
#[derive(Debug, Clone)]
pub enum Agent {
    Target(Target),
    Pursuer(Pursuer),
    Learner(Box<Learner>),
}

impl Agent {
    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::Target(_) => AgentKind::Target,
            Agent::Pursuer(_) => AgentKind::Pursuer,
            Agent::Learner(_) => AgentKind::Learner,
        }
    }

    pub fn as_learner(&self) -> Option<&Learner> {
        match self {
            Agent::Learner(learner) => Some(learner),
            _ => None,
        }
    }

    pub fn as_learner_mut(&mut self) -> Option<&mut Learner> {
        match self {
            Agent::Learner(learner) => Some(learner),
            _ => None,
        }
    }
}

impl From<Target> for Agent {
    fn from(target: Target) -> Self {
        Agent::Target(target)
    }
}

impl From<Pursuer> for Agent {
    fn from(pursuer: Pursuer) -> Self {
        Agent::Pursuer(pursuer)
    }
}

impl From<Learner> for Agent {
    fn from(learner: Learner) -> Self {
        Agent::Learner(Box::new(learner))
    }
}
