use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use super::{RewardConfig, Scoreboard, SimulationConfig, StepObserver, TickReport};
use crate::agents::{Agent, AgentId, Event, Learner, Pursuer, Target, TickContext};
use crate::metrics::TrainingMetrics;
use crate::rl::QLearner;
use crate::world::{GridWorld, Position, WorldError};

/// Where a newly added agent goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    At(Position),
    /// A uniformly random free cell
    Random,
}

/// Owns the world, the agents and everything they share during a tick
///
/// Agents update in registration order; each sees the effects of the ones
/// before it in the same tick. Observers run after every agent has acted and
/// before the tick counter advances.
pub struct Simulation {
    world: GridWorld,
    agents: Vec<Agent>,
    rng: StdRng,
    rewards: RewardConfig,
    metrics: TrainingMetrics,
    scoreboard: Scoreboard,
    observers: Vec<Box<dyn StepObserver>>,
}

impl Simulation {
    /// Wrap an existing world; agents registered in it beforehand are dropped
    pub fn new(mut world: GridWorld, config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        world.remove_agents();

        Self {
            world,
            agents: Vec::new(),
            rng,
            rewards: config.rewards.clone(),
            metrics: TrainingMetrics::new(),
            scoreboard: Scoreboard::default(),
            observers: Vec::new(),
        }
    }

    /// Empty simulation over the configured map
    pub fn from_config(config: &SimulationConfig) -> Result<Self, WorldError> {
        config.validate().map_err(WorldError::InvalidConfig)?;
        let world = GridWorld::from_map_file(&config.map_path)?;
        info!(
            map = ?config.map_path,
            width = world.width(),
            height = world.height(),
            "World loaded"
        );
        Ok(Self::new(world, config))
    }

    /// The usual session: one learner, one target and one pursuer at random cells
    ///
    /// The pursuer plans over `config.maze_path()`.
    pub fn populated(config: &SimulationConfig, brain: QLearner) -> Result<Self, WorldError> {
        let mut sim = Self::from_config(config)?;
        let pursuer = Pursuer::from_map_file(config.maze_path())?;
        sim.add_agent(Learner::new(brain), Placement::Random)?;
        sim.add_agent(Target::new(), Placement::Random)?;
        sim.add_agent(pursuer, Placement::Random)?;
        Ok(sim)
    }

    /// Register an agent and place it; it acts after every agent added before it
    ///
    /// The placement is resolved before registering, so a rejected placement
    /// (off the grid, on a wall, or no free cell left) adds nothing.
    pub fn add_agent(
        &mut self,
        agent: impl Into<Agent>,
        placement: Placement,
    ) -> Result<AgentId, WorldError> {
        let position = match placement {
            Placement::At(position) if !self.world.is_in_bounds(position) => {
                return Err(WorldError::OutOfBounds(position));
            }
            Placement::At(position) if self.world.is_wall(position) => {
                return Err(WorldError::Wall(position));
            }
            Placement::At(position) => position,
            Placement::Random => self.world.pick_random_location(&mut self.rng)?,
        };

        let agent = agent.into();
        let kind = agent.kind();
        let id = self.world.register(kind);
        self.agents.push(agent);
        self.world.relocate(id, position)?;
        debug!(?id, ?kind, ?position, "Agent added");
        Ok(id)
    }

    pub fn add_observer(&mut self, observer: Box<dyn StepObserver>) {
        self.observers.push(observer);
    }

    /// Rebuild the world from map text and remove every agent
    ///
    /// Metrics, scoreboard and observers carry over.
    pub fn reset(&mut self, map: &str) -> Result<(), WorldError> {
        self.world = GridWorld::from_text(map)?;
        self.agents.clear();
        info!(width = self.world.width(), height = self.world.height(), "World reset");
        Ok(())
    }

    pub fn reset_from_file(&mut self, path: &Path) -> Result<(), WorldError> {
        let text = crate::world::read_map(path)?;
        self.reset(&text)
    }

    /// Advance the simulation by one tick
    pub fn step(&mut self) -> Result<TickReport, WorldError> {
        let mut events = Vec::new();

        for index in 0..self.agents.len() {
            let id = AgentId(index);
            if self.world.position_of(id).is_none() {
                continue;
            }
            match &mut self.agents[index] {
                Agent::Target(_) => {}
                Agent::Pursuer(pursuer) => {
                    let action = pursuer.update(id, &mut self.world, &mut self.rng)?;
                    trace!(?id, ?action, "Pursuer acted");
                }
                Agent::Learner(learner) => {
                    let mut ctx = TickContext {
                        world: &mut self.world,
                        rng: &mut self.rng,
                        rewards: &self.rewards,
                        metrics: &mut self.metrics,
                        events: &mut events,
                    };
                    learner.update(id, &mut ctx)?;
                }
            }
        }

        for event in &events {
            match event {
                Event::Consumed { learner, .. } => {
                    self.scoreboard.learner_wins += 1;
                    debug!(tick = self.world.tick(), ?learner, "Target consumed");
                }
                Event::Caught { learner, pursuer } => {
                    self.scoreboard.pursuer_wins += 1;
                    debug!(tick = self.world.tick(), ?learner, ?pursuer, "Learner caught");
                }
            }
        }

        let report = TickReport {
            tick: self.world.tick(),
            events,
            scoreboard: self.scoreboard,
        };
        for observer in &mut self.observers {
            observer.on_tick(&self.world, &report);
        }
        self.world.advance_tick();
        Ok(report)
    }

    /// Override exploration for every learner (0 for pure exploitation)
    pub fn set_epsilon(&mut self, epsilon: f64) {
        for learner in self.agents.iter_mut().filter_map(Agent::as_learner_mut) {
            learner.brain_mut().set_epsilon(epsilon);
        }
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn tick(&self) -> u64 {
        self.world.tick()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.0)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.0)
    }

    /// First registered learner
    pub fn learner(&self) -> Option<&Learner> {
        self.agents.iter().find_map(Agent::as_learner)
    }

    pub fn learner_mut(&mut self) -> Option<&mut Learner> {
        self.agents.iter_mut().find_map(Agent::as_learner_mut)
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }
}
