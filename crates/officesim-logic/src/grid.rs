//! Grid primitives shared by every other module: cells, facing, pixel mapping.

use serde::{Deserialize, Serialize};

use crate::constants::TILE_SIZE;

/// A grid cell address. Signed so neighbor arithmetic can step off the edge
/// and be rejected by a bounds check instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The neighboring cell one step in `dir`.
    pub fn step(self, dir: Direction) -> Self {
        let (dc, dr) = dir.offset();
        Self::new(self.col + dc, self.row + dr)
    }

    pub fn offset(self, dc: i32, dr: i32) -> Self {
        Self::new(self.col + dc, self.row + dr)
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

/// Facing direction for characters and seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Down,
    Left,
    Right,
    Up,
}

impl Direction {
    /// Neighbor enumeration order for pathfinding: up, down, left, right.
    pub const SEARCH_ORDER: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit (col, row) offset.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
        }
    }
}

/// Direction of travel between two cells. Horizontal movement wins when the
/// cells differ on both axes; identical cells face down.
pub fn direction_between(from: GridPos, to: GridPos) -> Direction {
    let dc = to.col - from.col;
    let dr = to.row - from.row;
    if dc > 0 {
        Direction::Right
    } else if dc < 0 {
        Direction::Left
    } else if dr < 0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

/// Pixel center of a cell.
pub fn tile_center(pos: GridPos) -> (f32, f32) {
    (
        pos.col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        pos.row as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

/// Cell containing a pixel coordinate.
pub fn pixel_to_tile(x: f32, y: f32) -> GridPos {
    GridPos::new((x / TILE_SIZE).floor() as i32, (y / TILE_SIZE).floor() as i32)
}
