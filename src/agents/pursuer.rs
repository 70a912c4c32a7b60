use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use super::{AgentId, AgentKind};
use crate::pathfinding::{Maze, next_step};
use crate::world::{Direction, GridWorld, Position, WorldError};

/// What a pursuer did on its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuerMove {
    /// No prey on the map, or already sharing its cell
    Idle,
    /// Took the first step of a shortest path
    Pursued(Position),
    /// Planned a step into a wall of the live world and stayed put
    Blocked,
    /// No path to the prey; moved randomly, or stayed if boxed in
    Wandered(Option<Direction>),
}

/// Scripted hunter
///
/// Re-plans a full A* route to the learner every tick and commits to a
/// single step of it. Paths are never cached, so the pursuer reacts to every
/// move the prey makes.
#[derive(Debug, Clone)]
pub struct Pursuer {
    maze: Maze,
}

impl Pursuer {
    pub fn new(maze: Maze) -> Self {
        Self { maze }
    }

    /// Build the pursuer's private maze from a map file
    pub fn from_map_file(path: &Path) -> Result<Self, WorldError> {
        let maze = Maze::from_map_file(path)?;
        debug!(width = maze.width(), height = maze.height(), "Pursuer maze loaded");
        Ok(Self::new(maze))
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Chase the first registered learner by one step
    pub fn update<R: Rng + ?Sized>(
        &self,
        me: AgentId,
        world: &mut GridWorld,
        rng: &mut R,
    ) -> Result<PursuerMove, WorldError> {
        let here = world.position_of(me).ok_or(WorldError::UnknownAgent(me))?;
        let Some((_, prey)) = world.agents_of_kind(AgentKind::Learner).next() else {
            return Ok(PursuerMove::Idle);
        };
        if prey == here {
            return Ok(PursuerMove::Idle);
        }

        let bounds = (world.width(), world.height());
        if let Some(step) = next_step(&self.maze, bounds, here, prey) {
            if world.is_wall(step) {
                return Ok(PursuerMove::Blocked);
            }
            world.relocate(me, step)?;
            return Ok(PursuerMove::Pursued(step));
        }

        let open = world.open_directions(here, &Direction::CARDINAL);
        match open.choose(rng) {
            Some(&direction) => {
                world.step_agent(me, direction)?;
                Ok(PursuerMove::Wandered(Some(direction)))
            }
            None => Ok(PursuerMove::Wandered(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup(map: &str, hunter: Position, prey: Position) -> (GridWorld, Pursuer, AgentId) {
        let mut world = GridWorld::from_text(map).unwrap();
        let pursuer = Pursuer::new(Maze::from_text(map).unwrap());
        let id = world.register(AgentKind::Pursuer);
        world.relocate(id, hunter).unwrap();
        let learner = world.register(AgentKind::Learner);
        world.relocate(learner, prey).unwrap();
        (world, pursuer, id)
    }

    #[test]
    fn test_steps_along_shortest_path() {
        let map = "XXXXXXX\nX.....X\nX.XXX.X\nX.....X\nXXXXXXX\n";
        let (mut world, pursuer, id) = setup(map, Position::new(1, 1), Position::new(5, 1));
        let mut rng = StdRng::seed_from_u64(1);

        let result = pursuer.update(id, &mut world, &mut rng).unwrap();
        assert_eq!(result, PursuerMove::Pursued(Position::new(2, 1)));
        assert_eq!(world.position_of(id), Some(Position::new(2, 1)));
    }

    #[test]
    fn test_reaches_prey_over_several_ticks() {
        let map = "XXXXXXX\nX.....X\nX.XXX.X\nX.....X\nXXXXXXX\n";
        let (mut world, pursuer, id) = setup(map, Position::new(1, 3), Position::new(5, 1));
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..6 {
            pursuer.update(id, &mut world, &mut rng).unwrap();
        }
        assert_eq!(world.position_of(id), Some(Position::new(5, 1)));
        assert_eq!(
            pursuer.update(id, &mut world, &mut rng).unwrap(),
            PursuerMove::Idle
        );
    }

    #[test]
    fn test_idle_without_prey() {
        let mut world = GridWorld::with_size(3, 3);
        let pursuer = Pursuer::new(Maze::open(3, 3));
        let id = world.register(AgentKind::Pursuer);
        world.relocate(id, Position::new(0, 0)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            pursuer.update(id, &mut world, &mut rng).unwrap(),
            PursuerMove::Idle
        );
    }

    #[test]
    fn test_unreachable_prey_falls_back_to_random_move() {
        let map = "XXXXXXX\nX..X..X\nX..X..X\nXXXXXXX\n";
        let (mut world, pursuer, id) = setup(map, Position::new(1, 1), Position::new(5, 1));
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..50 {
            let result = pursuer.update(id, &mut world, &mut rng).unwrap();
            assert!(matches!(result, PursuerMove::Wandered(Some(_))));
            let pos = world.position_of(id).unwrap();
            assert!(!world.is_wall(pos));
            assert!(pos.x < 3);
        }
    }

    #[test]
    fn test_boxed_in_pursuer_stays_put() {
        let map = "XXXXX\nX.X.X\nXXXXX\n";
        let (mut world, pursuer, id) = setup(map, Position::new(1, 1), Position::new(3, 1));
        let mut rng = StdRng::seed_from_u64(2);

        let result = pursuer.update(id, &mut world, &mut rng).unwrap();
        assert_eq!(result, PursuerMove::Wandered(None));
        assert_eq!(world.position_of(id), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_maze_step_into_live_wall_is_rejected() {
        let live = "XXXXX\nX.X.X\nXXXXX\n";
        let mut world = GridWorld::from_text(live).unwrap();
        let pursuer = Pursuer::new(Maze::open(5, 3));
        let id = world.register(AgentKind::Pursuer);
        world.relocate(id, Position::new(1, 1)).unwrap();
        let learner = world.register(AgentKind::Learner);
        world.relocate(learner, Position::new(3, 1)).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        assert_eq!(
            pursuer.update(id, &mut world, &mut rng).unwrap(),
            PursuerMove::Blocked
        );
        assert_eq!(world.position_of(id), Some(Position::new(1, 1)));
    }
}
