use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use super::maze::Maze;
use crate::world::{Direction, Position};

/// Admissible heuristic on a 4-connected grid
pub fn manhattan(a: Position, b: Position) -> i32 {
    a.manhattan_distance(b)
}

/// Shortest 4-connected route from `start` to `goal`
///
/// `bounds` is the (width, height) of the live world; a neighbor must lie in
/// those bounds and be open in `maze`. The returned path excludes `start` and
/// ends with `goal`; it is empty when the two coincide. `None` means the goal
/// cannot be reached.
///
/// The open set pops the lowest f-score first and breaks ties on the lowest
/// row, then the lowest column, so equal-cost searches are reproducible.
pub fn find_path(
    maze: &Maze,
    bounds: (usize, usize),
    start: Position,
    goal: Position,
) -> Option<Vec<Position>> {
    if start == goal {
        return Some(Vec::new());
    }

    let (width, height) = (bounds.0 as i32, bounds.1 as i32);
    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut g_score: HashMap<Position, i32> = HashMap::from([(start, 0)]);

    open.push(Reverse((manhattan(start, goal), start.y, start.x)));

    while let Some(Reverse((f, y, x))) = open.pop() {
        let current = Position::new(x, y);
        let g = g_score[&current];
        if f > g + manhattan(current, goal) {
            // stale entry; a cheaper route to this node was already expanded
            continue;
        }

        if current == goal {
            return Some(reconstruct(&came_from, current));
        }

        for direction in Direction::CARDINAL {
            let next = current.moved_in_direction(direction);
            if next.x < 0 || next.y < 0 || next.x >= width || next.y >= height {
                continue;
            }
            if maze.is_blocked(next) {
                continue;
            }

            let tentative = g + 1;
            if g_score.get(&next).is_none_or(|&known| tentative < known) {
                came_from.insert(next, current);
                g_score.insert(next, tentative);
                open.push(Reverse((tentative + manhattan(next, goal), next.y, next.x)));
            }
        }
    }

    None
}

/// First move along the shortest route, if there is one
pub fn next_step(
    maze: &Maze,
    bounds: (usize, usize),
    start: Position,
    goal: Position,
) -> Option<Position> {
    find_path(maze, bounds, start, goal).and_then(|path| path.first().copied())
}

fn reconstruct(came_from: &HashMap<Position, Position>, mut current: Position) -> Vec<Position> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    // drop the start node
    path.pop();
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARRIER: &str = ".....\n..X..\n..X..\n..X..\n.....\n";

    fn is_connected(path: &[Position], start: Position) -> bool {
        let mut prev = start;
        for &step in path {
            if prev.manhattan_distance(step) != 1 {
                return false;
            }
            prev = step;
        }
        true
    }

    #[test]
    fn test_open_maze_path_is_manhattan() {
        let maze = Maze::open(5, 5);
        let start = Position::new(0, 0);
        let goal = Position::new(4, 3);

        let path = find_path(&maze, (5, 5), start, goal).unwrap();
        assert_eq!(path.len(), 7);
        assert_eq!(*path.last().unwrap(), goal);
        assert!(is_connected(&path, start));
    }

    #[test]
    fn test_barrier_forces_detour() {
        let maze = Maze::from_text(BARRIER).unwrap();
        let start = Position::new(0, 2);
        let goal = Position::new(4, 2);

        let path = find_path(&maze, (5, 5), start, goal).unwrap();
        // around the wall: 2 to the top or bottom row, 4 across, 2 back
        assert_eq!(path.len(), 8);
        assert!(path.iter().all(|p| !maze.is_blocked(*p)));
        assert!(is_connected(&path, start));
    }

    #[test]
    fn test_removing_walls_restores_direct_path() {
        let mut maze = Maze::from_text(BARRIER).unwrap();
        for y in 1..4 {
            maze.set_blocked(Position::new(2, y), false);
        }
        let path = find_path(&maze, (5, 5), Position::new(0, 2), Position::new(4, 2)).unwrap();
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_start_equals_goal() {
        let maze = Maze::open(3, 3);
        let p = Position::new(1, 1);
        assert_eq!(find_path(&maze, (3, 3), p, p), Some(Vec::new()));
        assert_eq!(next_step(&maze, (3, 3), p, p), None);
    }

    #[test]
    fn test_unreachable_goal() {
        let maze = Maze::from_text("..X..\n..X..\n..X..\n").unwrap();
        assert_eq!(
            find_path(&maze, (5, 3), Position::new(0, 0), Position::new(4, 0)),
            None
        );
    }

    #[test]
    fn test_bounds_limit_search() {
        let maze = Maze::open(5, 5);
        // the live world is only 3 columns wide, so column 4 is unreachable
        assert_eq!(
            find_path(&maze, (3, 5), Position::new(0, 0), Position::new(4, 0)),
            None
        );
    }

    #[test]
    fn test_tie_break_is_deterministic() {
        let maze = Maze::open(4, 4);
        let first = next_step(&maze, (4, 4), Position::new(0, 0), Position::new(3, 3));
        for _ in 0..10 {
            assert_eq!(
                next_step(&maze, (4, 4), Position::new(0, 0), Position::new(3, 3)),
                first
            );
        }
        // equal f-scores resolve towards the lower row first
        assert_eq!(first, Some(Position::new(1, 0)));
    }
}
