use std::path::Path;

use rand::Rng;
use rand::seq::SliceRandom;

use super::direction::Direction;
use super::error::WorldError;
use crate::agents::{AgentId, AgentKind};

/// Character that marks a blocked cell in a map file
pub const WALL_CHAR: char = 'X';

/// Rejection-sampling budget per grid cell before spawning falls back to a full scan
pub const SPAWN_ATTEMPTS_PER_CELL: usize = 16;

/// A position on the world grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction (unbounded)
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    pub fn manhattan_distance(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// One square of the world
#[derive(Debug, Clone)]
pub struct Cell {
    pub position: Position,
    pub wall: bool,
    /// Agents located here, oldest arrival first; the last one is "on top"
    occupants: Vec<AgentId>,
}

impl Cell {
    fn floor(position: Position) -> Self {
        Self {
            position,
            wall: false,
            occupants: Vec::new(),
        }
    }

    pub fn occupants(&self) -> &[AgentId] {
        &self.occupants
    }

    /// Floor cell with nobody on it
    pub fn is_free(&self) -> bool {
        !self.wall && self.occupants.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    kind: AgentKind,
    position: Option<Position>,
}

/// The live grid: walls, occupancy and the registry of agents placed on it
///
/// The world is the single authority on where agents are. Every position change
/// goes through [`GridWorld::relocate`], which keeps each agent's recorded
/// position and the occupant lists of the cells in agreement.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    roster: Vec<Registration>,
    tick: u64,
}

impl GridWorld {
    /// Create an all-floor world of the given size
    pub fn with_size(width: usize, height: usize) -> Self {
        let cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::floor(Position::new(x as i32, y as i32))))
            .collect();

        Self {
            width,
            height,
            cells,
            roster: Vec::new(),
            tick: 0,
        }
    }

    /// Build a world sized to fit the map text exactly
    pub fn from_text(text: &str) -> Result<Self, WorldError> {
        let (width, height) = map_dimensions(text)?;
        let mut world = Self::with_size(width, height);
        world.load(text);
        Ok(world)
    }

    /// Build a world from a map file on disk
    pub fn from_map_file(path: &Path) -> Result<Self, WorldError> {
        let text = read_map(path)?;
        Self::from_text(&text)
    }

    /// Replace the wall layout with the given map, centered in this grid
    ///
    /// Rows or columns that do not fit are cut off. Characters other than
    /// [`WALL_CHAR`], and cells past the end of a short line, are floor.
    /// Loading also clears every occupant and registered agent.
    pub fn load(&mut self, text: &str) {
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        let fh = lines.len().min(self.height);
        let fw = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .min(self.width);
        let start_y = (self.height - fh) / 2;
        let start_x = (self.width - fw) / 2;

        self.clear();
        for (j, line) in lines.iter().take(fh).enumerate() {
            for (i, ch) in line.chars().take(fw).enumerate() {
                let idx = self.index(start_x + i, start_y + j);
                self.cells[idx].wall = ch == WALL_CHAR;
            }
        }
    }

    /// Reset to an empty floor grid of the same size with no agents
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.wall = false;
            cell.occupants.clear();
        }
        self.roster.clear();
        self.tick = 0;
    }

    /// Drop every registered agent, keeping walls and the tick counter
    pub fn remove_agents(&mut self) {
        for cell in &mut self.cells {
            cell.occupants.clear();
        }
        self.roster.clear();
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if self.is_in_bounds(pos) {
            Some(&self.cells[self.index(pos.x as usize, pos.y as usize)])
        } else {
            None
        }
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|cell| cell.wall)
    }

    /// Iterate over all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Destination of one move from `pos`; leaving the grid keeps the agent where it is
    pub fn move_from(&self, pos: Position, direction: Direction) -> Position {
        let next = pos.moved_in_direction(direction);
        if self.is_in_bounds(next) { next } else { pos }
    }

    /// Wrapping lookup used for perception only; movement never wraps
    pub fn sense(&self, x: i32, y: i32) -> &Cell {
        let wx = x.rem_euclid(self.width as i32) as usize;
        let wy = y.rem_euclid(self.height as i32) as usize;
        &self.cells[self.index(wx, wy)]
    }

    /// Register a new agent; it has no position until placed
    pub fn register(&mut self, kind: AgentKind) -> AgentId {
        self.roster.push(Registration {
            kind,
            position: None,
        });
        AgentId(self.roster.len() - 1)
    }

    pub fn kind_of(&self, id: AgentId) -> Option<AgentKind> {
        self.roster.get(id.0).map(|r| r.kind)
    }

    pub fn position_of(&self, id: AgentId) -> Option<Position> {
        self.roster.get(id.0).and_then(|r| r.position)
    }

    /// All placed agents of one kind, in registration order
    pub fn agents_of_kind(&self, kind: AgentKind) -> impl Iterator<Item = (AgentId, Position)> + '_ {
        self.roster
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.kind == kind)
            .filter_map(|(i, r)| r.position.map(|p| (AgentId(i), p)))
    }

    /// Agents of one kind sharing `pos`, in the cell's occupant order
    pub fn occupants_of_kind(&self, pos: Position, kind: AgentKind) -> Vec<AgentId> {
        self.cell(pos)
            .map(|cell| {
                cell.occupants
                    .iter()
                    .copied()
                    .filter(|id| self.kind_of(*id) == Some(kind))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move an agent to `to`, detaching it from its previous cell first
    ///
    /// This is the only operation that changes occupancy. Relocating onto the
    /// current cell re-appends the agent, putting it on top of the stack.
    /// Off-grid destinations are rejected; wall checks are the caller's.
    pub fn relocate(&mut self, id: AgentId, to: Position) -> Result<(), WorldError> {
        if !self.is_in_bounds(to) {
            return Err(WorldError::OutOfBounds(to));
        }
        let from = self
            .roster
            .get(id.0)
            .ok_or(WorldError::UnknownAgent(id))?
            .position;

        if let Some(from) = from {
            let idx = self.index(from.x as usize, from.y as usize);
            self.cells[idx].occupants.retain(|occupant| *occupant != id);
        }
        let idx = self.index(to.x as usize, to.y as usize);
        self.cells[idx].occupants.push(id);
        self.roster[id.0].position = Some(to);
        Ok(())
    }

    /// Take one step in a direction, refusing to enter walls
    ///
    /// Returns whether the agent ended up on a new cell.
    pub fn step_agent(&mut self, id: AgentId, direction: Direction) -> Result<bool, WorldError> {
        let from = self.position_of(id).ok_or(WorldError::UnknownAgent(id))?;
        let to = self.move_from(from, direction);
        if self.is_wall(to) {
            return Ok(false);
        }
        self.relocate(id, to)?;
        Ok(to != from)
    }

    /// Directions from `pos` that stay in bounds and avoid walls
    pub fn open_directions(&self, pos: Position, candidates: &[Direction]) -> Vec<Direction> {
        candidates
            .iter()
            .copied()
            .filter(|d| {
                let next = pos.moved_in_direction(*d);
                self.is_in_bounds(next) && !self.is_wall(next)
            })
            .collect()
    }

    /// Uniformly random free cell (floor, no occupants)
    ///
    /// Samples at most `SPAWN_ATTEMPTS_PER_CELL * width * height` times, then
    /// picks among an exhaustive list of free cells so a crowded map still
    /// terminates. Fails only when no free cell exists.
    pub fn pick_random_location<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Position, WorldError> {
        let area = self.width * self.height;
        if area == 0 {
            return Err(WorldError::NoFreeCell { attempts: 0 });
        }

        let budget = SPAWN_ATTEMPTS_PER_CELL * area;
        for _ in 0..budget {
            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            let cell = &self.cells[self.index(x, y)];
            if cell.is_free() {
                return Ok(cell.position);
            }
        }

        let free: Vec<Position> = self
            .cells
            .iter()
            .filter(|cell| cell.is_free())
            .map(|cell| cell.position)
            .collect();
        free.choose(rng)
            .copied()
            .ok_or(WorldError::NoFreeCell { attempts: budget })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

/// Width (longest right-trimmed line) and height (line count) of a map
pub fn map_dimensions(text: &str) -> Result<(usize, usize), WorldError> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    if lines.is_empty() {
        return Err(WorldError::EmptyMap);
    }
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    Ok((width, lines.len()))
}

/// Read a map file, distinguishing "absent" from "unreadable"
pub fn read_map(path: &Path) -> Result<String, WorldError> {
    if !path.exists() {
        return Err(WorldError::MapMissing(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| WorldError::MapUnreadable {
        path: path.to_path_buf(),
        source,
    })
}
