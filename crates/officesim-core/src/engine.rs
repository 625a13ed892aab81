//! Office session - single owner of a running office
//!
//! An `OfficeSession` bundles the [`OfficeState`], the editor, and the seat
//! preferences remembered for agents that come and go. It is constructed
//! explicitly and started/stopped by the host; while stopped, lifecycle
//! events are dropped.

use std::collections::HashMap;
use std::io::Write;

use crate::components::AgentId;
use crate::events::AgentEvent;
use crate::office::{AgentRecord, OfficeState};
use crate::persistence::{save_snapshot, OfficeSnapshot, SaveError};
use crate::render::FrameView;
use officesim_logic::config::OfficeConfig;
use officesim_logic::editor::{EditTool, EditorState};
use officesim_logic::grid::pixel_to_tile;
use officesim_logic::layout::{default_layout, serialize_layout, ExpandSide, Layout, LayoutError};

pub struct OfficeSession {
    office: Option<OfficeState>,
    /// Edit-mode state. Persists across start/stop.
    pub editor: EditorState,
    config: OfficeConfig,
    preferences: HashMap<AgentId, AgentRecord>,
}

impl OfficeSession {
    pub fn new(config: OfficeConfig) -> Self {
        Self {
            editor: EditorState::new(config.undo_capacity),
            office: None,
            config,
            preferences: HashMap::new(),
        }
    }

    /// Start on `layout`, or on the default office. Restarting a running
    /// session keeps nobody: agents are re-created by their events.
    pub fn start(&mut self, layout: Option<Layout>) {
        if self.office.is_some() {
            self.stop();
        }
        let layout = layout.unwrap_or_else(default_layout);
        self.office = Some(OfficeState::new(layout, self.config.clone()));
        log::info!("Office session started");
    }

    /// Drop the running office, remembering where everyone sat.
    pub fn stop(&mut self) {
        if let Some(office) = self.office.take() {
            self.remember_all(&office);
            self.editor.set_edit_mode(false);
            log::info!("Office session stopped ({} agents remembered)", self.preferences.len());
        }
    }

    pub fn is_running(&self) -> bool {
        self.office.is_some()
    }

    pub fn office(&self) -> Option<&OfficeState> {
        self.office.as_ref()
    }

    pub fn office_mut(&mut self) -> Option<&mut OfficeState> {
        self.office.as_mut()
    }

    pub fn preference(&self, id: AgentId) -> Option<&AgentRecord> {
        self.preferences.get(&id)
    }

    fn remember_all(&mut self, office: &OfficeState) {
        for record in office.agent_records() {
            self.preferences.insert(record.id, record);
        }
    }

    /// Feed one lifecycle event. Ignored while stopped.
    pub fn handle(&mut self, event: &AgentEvent) {
        let Some(office) = self.office.as_mut() else {
            log::debug!("Session stopped; dropping {:?}", event);
            return;
        };
        match event {
            AgentEvent::Created { id } => match self.preferences.get(id) {
                Some(pref) => office.add_agent(*id, Some(pref.palette), pref.seat_id.as_deref()),
                None => office.add_agent(*id, None, None),
            },
            AgentEvent::Removed { id } => {
                if let Some(record) = office.agent_records().into_iter().find(|r| r.id == *id) {
                    self.preferences.insert(*id, record);
                }
                office.remove_agent(*id);
            }
            other => office.apply_event(other),
        }
    }

    pub fn update(&mut self, delta_seconds: f32) {
        if let Some(office) = self.office.as_mut() {
            office.update(delta_seconds);
        }
    }

    pub fn frame(&self) -> Option<FrameView<'_>> {
        self.office.as_ref().map(|office| office.frame(&self.editor))
    }

    // ── Pointer input ──────────────────────────────────────────────────

    /// Outside edit mode: select characters and send them to seats.
    ///
    /// Clicking a character toggles its selection. With an agent selected,
    /// clicking a free seat reassigns it there and clicking its own seat
    /// sends it back; any other click clears the selection.
    pub fn click(&mut self, x: f32, y: f32) {
        let Some(office) = self.office.as_mut() else {
            return;
        };
        if let Some(hit) = office.character_at(x, y) {
            let next = (office.selected_agent() != Some(hit)).then_some(hit);
            office.select_agent(next);
            return;
        }
        let Some(selected) = office.selected_agent() else {
            return;
        };
        let own_seat = office.character(selected).and_then(|ch| ch.seat_id.clone());
        let seat = office
            .seats()
            .at(pixel_to_tile(x, y))
            .map(|s| (s.uid.clone(), s.assigned));
        match seat {
            Some((uid, _)) if own_seat.as_deref() == Some(uid.as_str()) => {
                office.send_to_seat(selected)
            }
            Some((uid, false)) => office.reassign_seat(selected, &uid),
            _ => office.select_agent(None),
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if !self.editor.is_edit_mode {
            self.click(x, y);
            return;
        }
        let Some(office) = self.office.as_mut() else {
            return;
        };
        if let Some(next) = self.editor.pointer_down(office.layout(), pixel_to_tile(x, y)) {
            office.rebuild_from_layout(next);
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let Some(office) = self.office.as_mut() else {
            return;
        };
        if self.editor.is_edit_mode {
            office.set_hovered_agent(None);
            if let Some(next) = self.editor.pointer_move(office.layout(), pixel_to_tile(x, y)) {
                office.rebuild_from_layout(next);
            }
        } else {
            let hovered = office.character_at(x, y);
            office.set_hovered_agent(hovered);
        }
    }

    pub fn pointer_up(&mut self) {
        let Some(office) = self.office.as_mut() else {
            return;
        };
        if let Some(next) = self.editor.pointer_up(office.layout()) {
            office.rebuild_from_layout(next);
        }
    }

    // ── Editing ────────────────────────────────────────────────────────

    pub fn set_edit_mode(&mut self, on: bool) {
        self.editor.set_edit_mode(on);
        if let Some(office) = self.office.as_mut() {
            office.set_hovered_agent(None);
            if on {
                office.select_agent(None);
            }
        }
    }

    pub fn select_tool(&mut self, tool: EditTool) {
        self.editor.select_tool(tool);
    }

    pub fn delete_selected(&mut self) {
        self.apply_edit(|editor, layout| editor.delete_selected(layout));
    }

    pub fn expand(&mut self, side: ExpandSide) {
        self.apply_edit(|editor, layout| editor.expand(layout, side));
    }

    pub fn undo(&mut self) {
        self.apply_edit(|editor, layout| editor.undo(layout));
    }

    pub fn redo(&mut self) {
        self.apply_edit(|editor, layout| editor.redo(layout));
    }

    fn apply_edit(&mut self, edit: impl FnOnce(&mut EditorState, &Layout) -> Option<Layout>) {
        let Some(office) = self.office.as_mut() else {
            return;
        };
        if let Some(next) = edit(&mut self.editor, office.layout()) {
            office.rebuild_from_layout(next);
        }
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Current layout as JSON, if running.
    pub fn layout_json(&self) -> Option<Result<String, LayoutError>> {
        self.office.as_ref().map(|office| serialize_layout(office.layout()))
    }

    pub fn save_snapshot<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        match self.office.as_ref() {
            Some(office) => save_snapshot(writer, office),
            None => Ok(()),
        }
    }

    /// Restart on a snapshot's layout and remember its agents' seats.
    pub fn restore(&mut self, snapshot: OfficeSnapshot) {
        self.start(Some(snapshot.layout));
        for record in snapshot.agents {
            self.preferences.insert(record.id, record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::load_snapshot;
    use officesim_logic::constants::TILE_SIZE;
    use officesim_logic::grid::{tile_center, GridPos};
    use officesim_logic::layout::TileKind;

    fn running() -> OfficeSession {
        let mut session = OfficeSession::new(OfficeConfig::seeded(21));
        session.start(None);
        session
    }

    fn cell_px(col: i32, row: i32) -> (f32, f32) {
        tile_center(GridPos::new(col, row))
    }

    /// Let everyone walk to their seats.
    fn settle(session: &mut OfficeSession) {
        for _ in 0..400 {
            session.update(0.05);
        }
    }

    #[test]
    fn test_events_ignored_while_stopped() {
        let mut session = OfficeSession::new(OfficeConfig::seeded(1));
        session.handle(&AgentEvent::Created { id: 1 });
        assert!(session.office().is_none());
        session.start(None);
        session.handle(&AgentEvent::Created { id: 1 });
        assert_eq!(session.office().map(|o| o.agent_count()), Some(1));
        session.stop();
        session.handle(&AgentEvent::Created { id: 2 });
        assert!(!session.is_running());
    }

    #[test]
    fn test_remembers_seat_across_remove_and_restart() {
        let mut session = running();
        session.handle(&AgentEvent::Created { id: 1 });
        session.handle(&AgentEvent::Created { id: 2 });
        session.office_mut().unwrap().reassign_seat(2, "desk-4:left");
        session.handle(&AgentEvent::Removed { id: 2 });
        assert_eq!(
            session.preference(2).and_then(|r| r.seat_id.as_deref()),
            Some("desk-4:left")
        );

        session.stop();
        session.start(None);
        session.handle(&AgentEvent::Created { id: 2 });
        let office = session.office().unwrap();
        assert_eq!(office.character(2).unwrap().seat_id.as_deref(), Some("desk-4:left"));
        assert_eq!(office.character(2).unwrap().palette, 1);
    }

    #[test]
    fn test_click_selects_and_reassigns() {
        let mut session = running();
        session.handle(&AgentEvent::Created { id: 1 });
        settle(&mut session);
        let (x, y) = {
            let ch = session.office().unwrap().character(1).unwrap();
            (ch.x, ch.y)
        };
        session.click(x, y);
        assert_eq!(session.office().unwrap().selected_agent(), Some(1));

        // desk-2:top is at (6,1).
        let (sx, sy) = cell_px(6, 1);
        session.click(sx, sy);
        let office = session.office().unwrap();
        assert_eq!(office.character(1).unwrap().seat_id.as_deref(), Some("desk-2:top"));
        assert_eq!(office.selected_agent(), Some(1));

        // Empty floor clears the selection.
        let (fx, fy) = cell_px(5, 9);
        session.click(fx, fy);
        assert_eq!(session.office().unwrap().selected_agent(), None);
    }

    #[test]
    fn test_click_same_character_toggles() {
        let mut session = running();
        session.handle(&AgentEvent::Created { id: 1 });
        settle(&mut session);
        let (x, y) = {
            let ch = session.office().unwrap().character(1).unwrap();
            (ch.x, ch.y)
        };
        session.click(x, y);
        session.click(x, y);
        assert_eq!(session.office().unwrap().selected_agent(), None);
    }

    #[test]
    fn test_edit_paint_rebuilds_and_undoes() {
        let mut session = running();
        session.set_edit_mode(true);
        session.select_tool(EditTool::WallPaint);
        let (x, y) = cell_px(5, 9);
        session.pointer_down(x, y);
        session.pointer_move(x + TILE_SIZE, y);
        session.pointer_up();
        let office = session.office().unwrap();
        assert_eq!(office.layout().tile(GridPos::new(5, 9)), Some(TileKind::Wall));
        assert_eq!(office.layout().tile(GridPos::new(6, 9)), Some(TileKind::Wall));
        assert!(!office.walkable().contains(&GridPos::new(5, 9)));
        assert_eq!(session.editor.undo_len(), 1);

        session.undo();
        let office = session.office().unwrap();
        assert_eq!(office.layout().tile(GridPos::new(5, 9)), Some(TileKind::TileFloor));
        assert!(office.walkable().contains(&GridPos::new(5, 9)));
        session.redo();
        assert_eq!(
            session.office().unwrap().layout().tile(GridPos::new(6, 9)),
            Some(TileKind::Wall)
        );
    }

    #[test]
    fn test_deleting_a_desk_reseats_its_agent() {
        let mut session = running();
        session.handle(&AgentEvent::Created { id: 1 });
        session.set_edit_mode(true);
        let (x, y) = cell_px(2, 2);
        session.pointer_down(x, y);
        session.pointer_up();
        assert_eq!(session.editor.selected_furniture_uid.as_deref(), Some("desk-1"));
        session.delete_selected();
        let office = session.office().unwrap();
        assert!(office.layout().furniture_by_uid("desk-1").is_none());
        assert_eq!(office.character(1).unwrap().seat_id.as_deref(), Some("desk-2:top"));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut session = running();
        session.handle(&AgentEvent::Created { id: 7 });
        session.office_mut().unwrap().reassign_seat(7, "desk-3:right");
        session.set_edit_mode(true);
        session.expand(ExpandSide::Right);
        let mut bytes = Vec::new();
        session.save_snapshot(&mut bytes).unwrap();

        let mut fresh = OfficeSession::new(OfficeConfig::seeded(2));
        fresh.restore(load_snapshot(&bytes[..]).unwrap());
        fresh.handle(&AgentEvent::Created { id: 7 });
        let office = fresh.office().unwrap();
        assert_eq!(office.layout().cols, 21);
        assert_eq!(office.character(7).unwrap().seat_id.as_deref(), Some("desk-3:right"));
    }

    #[test]
    fn test_layout_json() {
        let mut session = OfficeSession::new(OfficeConfig::seeded(1));
        assert!(session.layout_json().is_none());
        session.start(None);
        let json = session.layout_json().unwrap().unwrap();
        assert!(json.starts_with('{'));
    }
}
