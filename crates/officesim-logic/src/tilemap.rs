//! Derived grid state: the tile map, blocked cells, and the walkable pool.
//!
//! All of it is recomputed from a [`Layout`] whenever the layout changes;
//! nothing here is patched incrementally.

use std::collections::HashSet;

use crate::grid::GridPos;
use crate::layout::{Layout, TileKind};

/// Read-only tile grid extracted from a layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileMap {
    pub cols: u32,
    pub rows: u32,
    tiles: Vec<TileKind>,
}

impl TileMap {
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            cols: layout.cols,
            rows: layout.rows,
            tiles: layout.tiles.clone(),
        }
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0 && pos.row >= 0 && (pos.col as u32) < self.cols && (pos.row as u32) < self.rows
    }

    pub fn get(&self, pos: GridPos) -> Option<TileKind> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles
            .get(pos.row as usize * self.cols as usize + pos.col as usize)
            .copied()
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }
}

/// Cells covered by furniture footprints. Unknown kinds block nothing.
pub fn blocked_tiles(layout: &Layout) -> HashSet<GridPos> {
    layout
        .furniture
        .iter()
        .flat_map(|item| item.footprint_cells())
        .collect()
}

/// In bounds, not a wall, not blocked.
pub fn is_walkable(map: &TileMap, blocked: &HashSet<GridPos>, pos: GridPos) -> bool {
    matches!(map.get(pos), Some(kind) if kind.is_floor()) && !blocked.contains(&pos)
}

/// Every walkable cell in row-major order.
pub fn walkable_tiles(map: &TileMap, blocked: &HashSet<GridPos>) -> Vec<GridPos> {
    let mut out = Vec::new();
    for row in 0..map.rows as i32 {
        for col in 0..map.cols as i32 {
            let pos = GridPos::new(col, row);
            if is_walkable(map, blocked, pos) {
                out.push(pos);
            }
        }
    }
    out
}
