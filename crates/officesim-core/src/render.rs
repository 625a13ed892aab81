//! Per-frame view for renderers
//!
//! A renderer reads a [`FrameView`] after `update` and draws it; nothing in
//! the view can write back into the simulation.

use serde::Serialize;

use crate::components::{AgentId, Bubble, BubbleKind, Character, CharacterState, Pose};
use crate::office::OfficeState;
use officesim_logic::editor::EditorState;
use officesim_logic::grid::Direction;
use officesim_logic::layout::TileKind;

/// One furniture sprite, positioned at its anchor's top-left pixel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FurnitureInstance {
    pub uid: String,
    pub kind: &'static str,
    pub sprite: &'static str,
    pub x: f32,
    pub y: f32,
    /// Depth key: pixel y of the footprint's bottom edge.
    pub z: f32,
    pub powered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterView {
    pub id: AgentId,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub state: CharacterState,
    pub pose: Pose,
    pub frame: u32,
    pub palette: u8,
    pub bubble: Option<BubbleKind>,
    pub selected: bool,
    pub hovered: bool,
    pub parent_id: Option<AgentId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GhostView {
    pub col: i32,
    pub row: i32,
    pub valid: bool,
}

/// Edit-mode hints drawn over the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorOverlay {
    pub ghost: Option<GhostView>,
    pub selected_furniture_uid: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FrameView<'a> {
    pub cols: u32,
    pub rows: u32,
    pub tiles: &'a [TileKind],
    pub furniture: &'a [FurnitureInstance],
    /// Back to front.
    pub characters: Vec<CharacterView>,
    pub editor: Option<EditorOverlay>,
}

impl OfficeState {
    pub fn frame(&self, editor: &EditorState) -> FrameView<'_> {
        let mut characters: Vec<CharacterView> = self
            .world
            .query::<(&Character, Option<&Bubble>)>()
            .iter()
            .map(|(_, (ch, bubble))| CharacterView {
                id: ch.id,
                x: ch.x,
                y: ch.y,
                dir: ch.dir,
                state: ch.state,
                pose: ch.pose(),
                frame: ch.frame,
                palette: ch.palette,
                bubble: bubble.map(|b| b.kind),
                selected: self.selected_agent == Some(ch.id),
                hovered: self.hovered_agent == Some(ch.id),
                parent_id: ch.parent_agent_id,
            })
            .collect();
        characters.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.id.cmp(&b.id)));

        let overlay = editor.is_edit_mode.then(|| EditorOverlay {
            ghost: editor.ghost.map(|g| GhostView {
                col: g.col,
                row: g.row,
                valid: g.valid,
            }),
            selected_furniture_uid: editor.selected_furniture_uid.clone(),
        });

        FrameView {
            cols: self.layout.cols,
            rows: self.layout.rows,
            tiles: &self.layout.tiles,
            furniture: &self.furniture,
            characters,
            editor: overlay,
        }
    }
}
