use serde::{Deserialize, Serialize};

/// Direction an agent can move on the grid
///
/// Screen coordinates: `y` grows downwards, so `Up` is `(0, -1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Direction {
    /// The four cardinal moves, in the order agents enumerate them
    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// All eight moves, clockwise from `Up`
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::UpRight => (1, -1),
            Direction::Right => (1, 0),
            Direction::DownRight => (1, 1),
            Direction::Down => (0, 1),
            Direction::DownLeft => (-1, 1),
            Direction::Left => (-1, 0),
            Direction::UpLeft => (-1, -1),
        }
    }

    /// Returns true for the four axis-aligned moves
    pub fn is_cardinal(&self) -> bool {
        matches!(
            self,
            Direction::Up | Direction::Right | Direction::Down | Direction::Left
        )
    }
}

/// Which set of moves a world offers to its agents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Neighborhood {
    /// Up, right, down, left
    #[default]
    Four,
    /// Cardinal moves plus diagonals
    Eight,
}

impl Neighborhood {
    pub fn directions(&self) -> &'static [Direction] {
        match self {
            Neighborhood::Four => &Direction::CARDINAL,
            Neighborhood::Eight => &Direction::ALL,
        }
    }
}
