//! Edit-mode state and the layout actions driven by pointer input.
//!
//! The editor never mutates a layout. Each action takes the current layout
//! and returns `Some(new_layout)` when something changed, after recording
//! the old value on the bounded undo stack; `None` means nothing to commit.

use std::borrow::Cow;
use std::collections::VecDeque;

use crate::catalog::{self, kinds};
use crate::constants::editor::UNDO_STACK_MAX_SIZE;
use crate::grid::GridPos;
use crate::layout::{
    can_place_furniture, expand_layout, move_furniture, paint_tile, place_furniture,
    remove_furniture, ExpandSide, Layout, PlacedFurniture, TileKind,
};

/// Edit-mode tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditTool {
    #[default]
    Select,
    TilePaint,
    WallPaint,
    FurniturePlace,
    FurniturePick,
    Eyedropper,
}

impl EditTool {
    pub fn paints(self) -> bool {
        matches!(self, EditTool::TilePaint | EditTool::WallPaint)
    }
}

/// Preview of the pending action at the pointer cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ghost {
    pub col: i32,
    pub row: i32,
    pub valid: bool,
}

/// Bounded stack of layout snapshots; pushing past capacity evicts the oldest.
#[derive(Debug, Clone)]
pub struct SnapshotStack {
    entries: VecDeque<Layout>,
    capacity: usize,
}

impl SnapshotStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, layout: Layout) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(layout);
    }

    pub fn pop(&mut self) -> Option<Layout> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[derive(Debug, Clone, Default)]
struct DragState {
    last_cell: Option<GridPos>,
    /// Pointer cell minus furniture anchor, for select-drag moves.
    offset: (i32, i32),
    /// Whether this stroke already recorded its undo snapshot.
    snapshot_taken: bool,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub is_edit_mode: bool,
    pub active_tool: EditTool,
    pub selected_tile_type: TileKind,
    pub selected_furniture_type: String,
    pub ghost: Option<Ghost>,
    pub selected_furniture_uid: Option<String>,
    pub is_dragging: bool,
    drag: DragState,
    undo_stack: SnapshotStack,
    redo_stack: SnapshotStack,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(UNDO_STACK_MAX_SIZE)
    }
}

impl EditorState {
    pub fn new(undo_capacity: usize) -> Self {
        Self {
            is_edit_mode: false,
            active_tool: EditTool::Select,
            selected_tile_type: TileKind::WoodFloor,
            selected_furniture_type: kinds::DESK.to_string(),
            ghost: None,
            selected_furniture_uid: None,
            is_dragging: false,
            drag: DragState::default(),
            undo_stack: SnapshotStack::new(undo_capacity),
            redo_stack: SnapshotStack::new(undo_capacity),
        }
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        self.is_edit_mode = on;
        if !on {
            self.ghost = None;
            self.selected_furniture_uid = None;
            self.end_drag();
        }
    }

    pub fn select_tool(&mut self, tool: EditTool) {
        self.active_tool = tool;
        self.ghost = None;
        self.end_drag();
        if tool != EditTool::Select {
            self.selected_furniture_uid = None;
        }
    }

    // ── Undo / redo ────────────────────────────────────────────────────

    /// Record a snapshot before an edit. Any new edit invalidates redo.
    pub fn push_undo(&mut self, layout: Layout) {
        self.undo_stack.push(layout);
        self.redo_stack.clear();
    }

    pub fn pop_undo(&mut self) -> Option<Layout> {
        self.undo_stack.pop()
    }

    pub fn push_redo(&mut self, layout: Layout) {
        self.redo_stack.push(layout);
    }

    pub fn pop_redo(&mut self) -> Option<Layout> {
        self.redo_stack.pop()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Step back: returns the layout to restore and keeps `current` for redo.
    pub fn undo(&mut self, current: &Layout) -> Option<Layout> {
        let previous = self.pop_undo()?;
        self.redo_stack.push(current.clone());
        self.clear_stale_selection(&previous);
        Some(previous)
    }

    pub fn redo(&mut self, current: &Layout) -> Option<Layout> {
        let next = self.pop_redo()?;
        self.undo_stack.push(current.clone());
        self.clear_stale_selection(&next);
        Some(next)
    }

    fn clear_stale_selection(&mut self, layout: &Layout) {
        if let Some(uid) = &self.selected_furniture_uid {
            if layout.furniture_by_uid(uid).is_none() {
                self.selected_furniture_uid = None;
            }
        }
    }

    fn commit(&mut self, before: &Layout, after: Cow<'_, Layout>) -> Option<Layout> {
        match after {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => {
                if !(self.is_dragging && self.drag.snapshot_taken) {
                    self.push_undo(before.clone());
                    self.drag.snapshot_taken = self.is_dragging;
                }
                Some(next)
            }
        }
    }

    // ── Pointer input ──────────────────────────────────────────────────

    /// Pointer entered `pos`. Updates the ghost and, mid paint-drag, paints
    /// the cell once on entry.
    pub fn pointer_move(&mut self, layout: &Layout, pos: GridPos) -> Option<Layout> {
        if !self.is_edit_mode {
            return None;
        }
        self.ghost = Some(self.ghost_at(layout, pos));
        if !(self.is_dragging && self.active_tool.paints()) || self.drag.last_cell == Some(pos) {
            return None;
        }
        self.drag.last_cell = Some(pos);
        self.paint(layout, pos)
    }

    pub fn pointer_down(&mut self, layout: &Layout, pos: GridPos) -> Option<Layout> {
        if !self.is_edit_mode {
            return None;
        }
        self.ghost = Some(self.ghost_at(layout, pos));
        match self.active_tool {
            EditTool::TilePaint | EditTool::WallPaint => {
                self.begin_drag(pos, (0, 0));
                self.paint(layout, pos)
            }
            EditTool::FurniturePlace => {
                let kind = self.selected_furniture_type.clone();
                let item = PlacedFurniture::new(layout.next_uid(&kind), kind, pos.col, pos.row);
                let uid = item.uid.clone();
                let result = self.commit(layout, place_furniture(layout, item));
                if result.is_some() {
                    self.selected_furniture_uid = Some(uid);
                }
                result
            }
            EditTool::FurniturePick => {
                if let Some(item) = layout.furniture_at(pos) {
                    if catalog::lookup(&item.kind).is_some() {
                        self.selected_furniture_type = item.kind.clone();
                        self.select_tool(EditTool::FurniturePlace);
                    }
                }
                None
            }
            EditTool::Eyedropper => {
                if let Some(kind) = layout.tile(pos) {
                    self.selected_tile_type = kind;
                    self.select_tool(EditTool::TilePaint);
                }
                None
            }
            EditTool::Select => {
                match layout.furniture_at(pos) {
                    Some(item) => {
                        self.selected_furniture_uid = Some(item.uid.clone());
                        self.begin_drag(pos, (pos.col - item.col, pos.row - item.row));
                        // The grab offset only applies once dragging.
                        self.ghost = Some(self.ghost_at(layout, pos));
                    }
                    None => self.selected_furniture_uid = None,
                }
                None
            }
        }
    }

    /// Release the pointer. A select-drag commits its move here when the
    /// ghost is valid.
    pub fn pointer_up(&mut self, layout: &Layout) -> Option<Layout> {
        let was_dragging = self.is_dragging;
        let result = if was_dragging && self.active_tool == EditTool::Select {
            match (self.selected_furniture_uid.clone(), self.ghost) {
                (Some(uid), Some(ghost)) if ghost.valid => {
                    self.is_dragging = false;
                    self.commit(layout, move_furniture(layout, &uid, ghost.col, ghost.row))
                }
                _ => None,
            }
        } else {
            None
        };
        self.end_drag();
        result
    }

    pub fn delete_selected(&mut self, layout: &Layout) -> Option<Layout> {
        if !self.is_edit_mode {
            return None;
        }
        let uid = self.selected_furniture_uid.take()?;
        self.commit(layout, remove_furniture(layout, &uid))
    }

    pub fn expand(&mut self, layout: &Layout, side: ExpandSide) -> Option<Layout> {
        if !self.is_edit_mode {
            return None;
        }
        self.commit(layout, expand_layout(layout, side))
    }

    fn paint(&mut self, layout: &Layout, pos: GridPos) -> Option<Layout> {
        let kind = match self.active_tool {
            EditTool::WallPaint => TileKind::Wall,
            _ => self.selected_tile_type,
        };
        self.commit(layout, paint_tile(layout, pos.col, pos.row, kind))
    }

    fn begin_drag(&mut self, pos: GridPos, offset: (i32, i32)) {
        self.is_dragging = true;
        self.drag = DragState {
            last_cell: Some(pos),
            offset,
            snapshot_taken: false,
        };
    }

    fn end_drag(&mut self) {
        self.is_dragging = false;
        self.drag = DragState::default();
    }

    fn ghost_at(&self, layout: &Layout, pos: GridPos) -> Ghost {
        let (anchor, valid) = match self.active_tool {
            EditTool::FurniturePlace => (
                pos,
                can_place_furniture(layout, &self.selected_furniture_type, pos.col, pos.row, None),
            ),
            EditTool::FurniturePick => (pos, layout.furniture_at(pos).is_some()),
            EditTool::Select if self.is_dragging => {
                let anchor = pos.offset(-self.drag.offset.0, -self.drag.offset.1);
                let valid = self
                    .selected_furniture_uid
                    .as_deref()
                    .and_then(|uid| layout.furniture_by_uid(uid))
                    .is_some_and(|item| {
                        can_place_furniture(
                            layout,
                            &item.kind,
                            anchor.col,
                            anchor.row,
                            Some(&item.uid),
                        )
                    });
                (anchor, valid)
            }
            _ => (pos, layout.in_bounds(pos)),
        };
        Ghost {
            col: anchor.col,
            row: anchor.row,
            valid,
        }
    }
}
