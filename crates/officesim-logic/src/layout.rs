//! Layout model - the persisted tile grid and furniture list.
//!
//! Every mutator is a pure function from `&Layout` to `Cow<Layout>`:
//! `Cow::Borrowed` means the request was rejected or changed nothing and the
//! caller still holds the exact input, `Cow::Owned` is a fresh layout. Undo
//! therefore only has to keep whole prior values around.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{self, kinds};
use crate::constants::{grid, LAYOUT_VERSION};
use crate::grid::GridPos;

/// Floor material of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    Wall,
    TileFloor,
    WoodFloor,
    Carpet,
    Doorway,
}

impl TileKind {
    /// Walls are never walkable; everything else is unless furniture covers it.
    pub fn is_floor(self) -> bool {
        self != TileKind::Wall
    }
}

/// A furniture instance anchored at its top-left cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedFurniture {
    pub uid: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub col: i32,
    pub row: i32,
}

impl PlacedFurniture {
    pub fn new(uid: impl Into<String>, kind: impl Into<String>, col: i32, row: i32) -> Self {
        Self {
            uid: uid.into(),
            kind: kind.into(),
            col,
            row,
        }
    }

    pub fn anchor(&self) -> GridPos {
        GridPos::new(self.col, self.row)
    }

    /// Cells covered by this item's footprint; empty for unknown kinds.
    pub fn footprint_cells(&self) -> Vec<GridPos> {
        match catalog::footprint(&self.kind) {
            Some((w, h)) => footprint_at(self.anchor(), w, h).collect(),
            None => Vec::new(),
        }
    }

    pub fn covers(&self, pos: GridPos) -> bool {
        match catalog::footprint(&self.kind) {
            Some((w, h)) => rect_contains(self.anchor(), w, h, pos),
            None => false,
        }
    }
}

fn footprint_at(anchor: GridPos, w: u32, h: u32) -> impl Iterator<Item = GridPos> {
    (0..h as i32).flat_map(move |dr| (0..w as i32).map(move |dc| anchor.offset(dc, dr)))
}

fn rect_contains(anchor: GridPos, w: u32, h: u32, pos: GridPos) -> bool {
    pos.col >= anchor.col
        && pos.col < anchor.col + w as i32
        && pos.row >= anchor.row
        && pos.row < anchor.row + h as i32
}

fn rects_overlap(a: GridPos, aw: u32, ah: u32, b: GridPos, bw: u32, bh: u32) -> bool {
    a.col < b.col + bw as i32
        && b.col < a.col + aw as i32
        && a.row < b.row + bh as i32
        && b.row < a.row + ah as i32
}

/// The persisted office floor: row-major tiles plus furniture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub version: u32,
    pub cols: u32,
    pub rows: u32,
    pub tiles: Vec<TileKind>,
    pub furniture: Vec<PlacedFurniture>,
}

impl Layout {
    /// A grid of one tile kind with no furniture.
    pub fn filled(cols: u32, rows: u32, kind: TileKind) -> Self {
        Self {
            version: LAYOUT_VERSION,
            cols,
            rows,
            tiles: vec![kind; cols as usize * rows as usize],
            furniture: Vec::new(),
        }
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0 && pos.row >= 0 && (pos.col as u32) < self.cols && (pos.row as u32) < self.rows
    }

    /// Row-major index of a cell, if in range.
    pub fn index(&self, pos: GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.row as usize * self.cols as usize + pos.col as usize)
        } else {
            None
        }
    }

    pub fn tile(&self, pos: GridPos) -> Option<TileKind> {
        self.index(pos).and_then(|i| self.tiles.get(i).copied())
    }

    pub fn furniture_by_uid(&self, uid: &str) -> Option<&PlacedFurniture> {
        self.furniture.iter().find(|f| f.uid == uid)
    }

    /// Topmost (most recently placed) furniture covering a cell.
    pub fn furniture_at(&self, pos: GridPos) -> Option<&PlacedFurniture> {
        self.furniture.iter().rev().find(|f| f.covers(pos))
    }

    /// A uid for `kind` not yet used in this layout.
    pub fn next_uid(&self, kind: &str) -> String {
        let mut n = self.furniture.len() + 1;
        loop {
            let uid = format!("{}-{}", kind, n);
            if self.furniture_by_uid(&uid).is_none() {
                return uid;
            }
            n += 1;
        }
    }
}

// ── Edits ──────────────────────────────────────────────────────────────

/// Replace one tile. Borrowed if the cell is out of range or already `kind`.
pub fn paint_tile(layout: &Layout, col: i32, row: i32, kind: TileKind) -> Cow<'_, Layout> {
    let Some(index) = layout.index(GridPos::new(col, row)) else {
        return Cow::Borrowed(layout);
    };
    match layout.tiles.get(index) {
        Some(&current) if current != kind => {}
        _ => return Cow::Borrowed(layout),
    }
    let mut next = layout.clone();
    match next.tiles.get_mut(index) {
        Some(tile) => *tile = kind,
        None => return Cow::Borrowed(layout),
    }
    Cow::Owned(next)
}

/// Whether `kind` fits at (col, row): footprint in bounds and not overlapping
/// any other known furniture. `exclude_uid` is ignored so an item can be
/// tested against its own destination while moving.
pub fn can_place_furniture(
    layout: &Layout,
    kind: &str,
    col: i32,
    row: i32,
    exclude_uid: Option<&str>,
) -> bool {
    let Some((w, h)) = catalog::footprint(kind) else {
        return false;
    };
    let anchor = GridPos::new(col, row);
    if col < 0 || row < 0 || col as u32 + w > layout.cols || row as u32 + h > layout.rows {
        return false;
    }
    !layout.furniture.iter().any(|other| {
        if exclude_uid == Some(other.uid.as_str()) {
            return false;
        }
        match catalog::footprint(&other.kind) {
            Some((ow, oh)) => rects_overlap(anchor, w, h, other.anchor(), ow, oh),
            None => false,
        }
    })
}

/// Append `item` if it fits and its uid is unused.
pub fn place_furniture(layout: &Layout, item: PlacedFurniture) -> Cow<'_, Layout> {
    if layout.furniture_by_uid(&item.uid).is_some()
        || !can_place_furniture(layout, &item.kind, item.col, item.row, None)
    {
        log::debug!(
            "rejected placement of {} ({}) at {},{}",
            item.uid, item.kind, item.col, item.row
        );
        return Cow::Borrowed(layout);
    }
    let mut next = layout.clone();
    next.furniture.push(item);
    Cow::Owned(next)
}

/// Drop the item with `uid`. Borrowed if no such item.
pub fn remove_furniture<'a>(layout: &'a Layout, uid: &str) -> Cow<'a, Layout> {
    if layout.furniture_by_uid(uid).is_none() {
        return Cow::Borrowed(layout);
    }
    let mut next = layout.clone();
    next.furniture.retain(|f| f.uid != uid);
    Cow::Owned(next)
}

/// Re-anchor the item with `uid`. Borrowed if unknown, unmoved, or the
/// destination does not fit (checked with the item itself excluded).
pub fn move_furniture<'a>(layout: &'a Layout, uid: &str, col: i32, row: i32) -> Cow<'a, Layout> {
    let Some(item) = layout.furniture_by_uid(uid) else {
        return Cow::Borrowed(layout);
    };
    if (item.col, item.row) == (col, row)
        || !can_place_furniture(layout, &item.kind, col, row, Some(uid))
    {
        return Cow::Borrowed(layout);
    }
    let mut next = layout.clone();
    if let Some(moved) = next.furniture.iter_mut().find(|f| f.uid == uid) {
        moved.col = col;
        moved.row = row;
    }
    Cow::Owned(next)
}

/// Side of the grid to grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandSide {
    Left,
    Right,
    Top,
    Bottom,
}

/// Grow the grid by one column or row, filling the new cells with walls.
/// Furniture keeps its cells: anchors shift when growing left or up.
/// Borrowed when the grid is already at its maximum size.
pub fn expand_layout(layout: &Layout, side: ExpandSide) -> Cow<'_, Layout> {
    let (cols, rows, shift_c, shift_r) = match side {
        ExpandSide::Left => (layout.cols + 1, layout.rows, 1, 0),
        ExpandSide::Right => (layout.cols + 1, layout.rows, 0, 0),
        ExpandSide::Top => (layout.cols, layout.rows + 1, 0, 1),
        ExpandSide::Bottom => (layout.cols, layout.rows + 1, 0, 0),
    };
    if cols > grid::MAX_COLS || rows > grid::MAX_ROWS {
        return Cow::Borrowed(layout);
    }

    let mut next = Layout::filled(cols, rows, TileKind::Wall);
    next.version = layout.version;
    for row in 0..layout.rows as i32 {
        for col in 0..layout.cols as i32 {
            let from = GridPos::new(col, row);
            let to = from.offset(shift_c, shift_r);
            if let (Some(kind), Some(i)) = (layout.tile(from), next.index(to)) {
                next.tiles[i] = kind;
            }
        }
    }
    next.furniture = layout
        .furniture
        .iter()
        .map(|f| PlacedFurniture {
            col: f.col + shift_c,
            row: f.row + shift_r,
            ..f.clone()
        })
        .collect();
    Cow::Owned(next)
}

// ── Default floor plan ─────────────────────────────────────────────────

/// The starter office: two rooms with different floors joined by a doorway
/// in the dividing wall, a carpet nook in the right room, and a set of desks.
pub fn default_layout() -> Layout {
    let cols = grid::DEFAULT_COLS as i32;
    let rows = grid::DEFAULT_ROWS as i32;
    let divider = cols / 2;

    let mut layout = Layout::filled(cols as u32, rows as u32, TileKind::Wall);
    for row in 1..rows - 1 {
        for col in 1..cols - 1 {
            let kind = if col == divider {
                if (4..=6).contains(&row) {
                    TileKind::Doorway
                } else {
                    TileKind::Wall
                }
            } else if col < divider {
                TileKind::TileFloor
            } else if col >= cols - 6 && row >= rows - 4 {
                TileKind::Carpet
            } else {
                TileKind::WoodFloor
            };
            if let Some(i) = layout.index(GridPos::new(col, row)) {
                layout.tiles[i] = kind;
            }
        }
    }

    layout.furniture = vec![
        PlacedFurniture::new("desk-1", kinds::DESK, 2, 2),
        PlacedFurniture::new("desk-2", kinds::DESK, 6, 2),
        PlacedFurniture::new("desk-3", kinds::DESK, 2, 6),
        PlacedFurniture::new("desk-4", kinds::DESK, 6, 6),
        PlacedFurniture::new("desk-5", kinds::DESK, 12, 2),
        PlacedFurniture::new("desk-6", kinds::DESK, 16, 2),
        PlacedFurniture::new("bookshelf-1", kinds::BOOKSHELF, 1, 8),
        PlacedFurniture::new("plant-1", kinds::PLANT, 9, 1),
        PlacedFurniture::new("cooler-1", kinds::COOLER, 9, 9),
        PlacedFurniture::new("whiteboard-1", kinds::WHITEBOARD, 11, 6),
        PlacedFurniture::new("pc-1", kinds::PC, 11, 1),
        PlacedFurniture::new("sofa-1", kinds::SOFA, 15, 9),
        PlacedFurniture::new("plant-2", kinds::PLANT, 18, 7),
        PlacedFurniture::new("lamp-1", kinds::LAMP, 18, 9),
    ];
    layout
}

// ── Serialization ──────────────────────────────────────────────────────

/// Why a textual layout was rejected.
#[derive(Debug)]
pub enum LayoutError {
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
    TileCountMismatch { expected: usize, found: usize },
    DuplicateUid(String),
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        LayoutError::Json(e)
    }
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::Json(e) => write!(f, "Layout JSON error: {}", e),
            LayoutError::VersionMismatch { expected, found } => {
                write!(f, "Layout version mismatch: expected {}, found {}", expected, found)
            }
            LayoutError::TileCountMismatch { expected, found } => {
                write!(f, "Layout tile count mismatch: expected {}, found {}", expected, found)
            }
            LayoutError::DuplicateUid(uid) => write!(f, "Duplicate furniture uid: {}", uid),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Json(e) => Some(e),
            _ => None,
        }
    }
}

/// Encode a layout as JSON.
pub fn serialize_layout(layout: &Layout) -> Result<String, LayoutError> {
    Ok(serde_json::to_string(layout)?)
}

/// Decode and validate a layout, reporting why it was rejected.
pub fn parse_layout(text: &str) -> Result<Layout, LayoutError> {
    let layout: Layout = serde_json::from_str(text)?;
    validate_layout(&layout)?;
    Ok(layout)
}

/// Structural checks shared by every decoder: version tag, one tile per
/// cell, unique furniture uids.
pub fn validate_layout(layout: &Layout) -> Result<(), LayoutError> {
    if layout.version != LAYOUT_VERSION {
        return Err(LayoutError::VersionMismatch {
            expected: LAYOUT_VERSION,
            found: layout.version,
        });
    }
    let expected = layout.cols as usize * layout.rows as usize;
    if layout.tiles.len() != expected {
        return Err(LayoutError::TileCountMismatch {
            expected,
            found: layout.tiles.len(),
        });
    }
    let mut seen = HashSet::new();
    for item in &layout.furniture {
        if !seen.insert(item.uid.as_str()) {
            return Err(LayoutError::DuplicateUid(item.uid.clone()));
        }
    }
    Ok(())
}

/// Decode a layout; `None` on any rejection. Callers fall back to
/// [`default_layout`].
pub fn deserialize_layout(text: &str) -> Option<Layout> {
    match parse_layout(text) {
        Ok(layout) => Some(layout),
        Err(e) => {
            log::warn!("Rejected persisted layout: {}", e);
            None
        }
    }
}
