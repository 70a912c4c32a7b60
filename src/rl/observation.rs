use serde::{Deserialize, Serialize};

use crate::agents::AgentKind;
use crate::world::{GridWorld, Position};

/// Moore-neighborhood offsets, in the order their wall flags are stored
///
/// Column-major from the top-left: NW, W, SW, N, S, NE, E, SE.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// What the learner perceives on one tick
///
/// Eight wall flags around it (sensed with wrap-around at the map edges),
/// plus the sign of the displacement towards the nearest pursuer and towards
/// the target on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State {
    pub walls: [bool; 8],
    pub pursuer: (i8, i8),
    pub target: (i8, i8),
}

/// Encode the learner's surroundings at `at`
pub fn observe(world: &GridWorld, at: Position) -> State {
    let mut walls = [false; 8];
    for (flag, (dx, dy)) in walls.iter_mut().zip(NEIGHBOR_OFFSETS) {
        *flag = world.sense(at.x + dx, at.y + dy).wall;
    }

    // nearest by Manhattan distance; first registered wins ties
    let pursuer = world
        .agents_of_kind(AgentKind::Pursuer)
        .map(|(_, pos)| pos)
        .min_by_key(|pos| pos.manhattan_distance(at))
        .map(|pos| signed_offset(at, pos))
        .unwrap_or((0, 0));

    let target = world
        .agents_of_kind(AgentKind::Target)
        .next()
        .map(|(_, pos)| signed_offset(at, pos))
        .unwrap_or((0, 0));

    State {
        walls,
        pursuer,
        target,
    }
}

fn signed_offset(from: Position, to: Position) -> (i8, i8) {
    (
        (to.x - from.x).signum() as i8,
        (to.y - from.y).signum() as i8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(world: &mut GridWorld, kind: AgentKind, x: i32, y: i32) {
        let id = world.register(kind);
        world.relocate(id, Position::new(x, y)).unwrap();
    }

    #[test]
    fn test_wall_flags() {
        let world = GridWorld::from_text("XXX\nX..\n...\n").unwrap();
        let state = observe(&world, Position::new(1, 1));
        // NW, W, SW, N, S, NE, E, SE
        assert_eq!(
            state.walls,
            [true, true, false, true, false, true, false, false]
        );
        assert_eq!(state.pursuer, (0, 0));
        assert_eq!(state.target, (0, 0));
    }

    #[test]
    fn test_perception_wraps_at_edges() {
        let world = GridWorld::from_text("...\n...\n..X\n").unwrap();
        let state = observe(&world, Position::new(0, 0));
        // north-west of (0, 0) wraps to (2, 2)
        assert!(state.walls[0]);
        assert_eq!(state.walls.iter().filter(|w| **w).count(), 1);
    }

    #[test]
    fn test_direction_signs() {
        let mut world = GridWorld::with_size(7, 7);
        place(&mut world, AgentKind::Pursuer, 6, 0);
        place(&mut world, AgentKind::Pursuer, 3, 5);
        place(&mut world, AgentKind::Target, 0, 3);

        let state = observe(&world, Position::new(3, 3));
        // (3, 5) is closer than (6, 0)
        assert_eq!(state.pursuer, (0, 1));
        assert_eq!(state.target, (-1, 0));
    }
}
