use std::path::Path;

use crate::world::{Position, WALL_CHAR, WorldError, map_dimensions, read_map};

/// Passable/blocked grid a pursuer plans over
///
/// Built from a map file independently of the live world, but addressed with
/// the same coordinates. Unlike the live world, cells past the end of a short
/// line are blocked, and anything outside the maze counts as blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl Maze {
    pub fn from_text(text: &str) -> Result<Self, WorldError> {
        let (width, height) = map_dimensions(text)?;
        let mut blocked = vec![true; width * height];

        for (y, line) in text.lines().map(str::trim_end).enumerate() {
            for (x, ch) in line.chars().enumerate() {
                blocked[y * width + x] = ch == WALL_CHAR;
            }
        }

        Ok(Self {
            width,
            height,
            blocked,
        })
    }

    pub fn from_map_file(path: &Path) -> Result<Self, WorldError> {
        let text = read_map(path)?;
        Self::from_text(&text)
    }

    /// A maze with nothing blocked
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            blocked: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_blocked(&self, pos: Position) -> bool {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i32 || pos.y >= self.height as i32 {
            return true;
        }
        self.blocked[pos.y as usize * self.width + pos.x as usize]
    }

    pub fn set_blocked(&mut self, pos: Position, blocked: bool) {
        if pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
        {
            self.blocked[pos.y as usize * self.width + pos.x as usize] = blocked;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walls_and_short_lines_are_blocked() {
        let maze = Maze::from_text("X..\n.\n").unwrap();
        assert_eq!((maze.width(), maze.height()), (3, 2));
        assert!(maze.is_blocked(Position::new(0, 0)));
        assert!(!maze.is_blocked(Position::new(1, 0)));
        assert!(!maze.is_blocked(Position::new(0, 1)));
        // past the end of the second line
        assert!(maze.is_blocked(Position::new(1, 1)));
        assert!(maze.is_blocked(Position::new(-1, 0)));
        assert!(maze.is_blocked(Position::new(3, 0)));
    }

    #[test]
    fn test_open_maze() {
        let mut maze = Maze::open(4, 4);
        assert!(!maze.is_blocked(Position::new(3, 3)));
        maze.set_blocked(Position::new(3, 3), true);
        assert!(maze.is_blocked(Position::new(3, 3)));
    }
}
