//! Office state - the orchestrator that owns every avatar
//!
//! `OfficeState` holds the active layout, everything derived from it (tile
//! map, blocked cells, walkable pool, seats, furniture render list) and the
//! ECS world of characters. All public operations are total: an unknown id,
//! an unknown or taken seat, or a duplicate add is logged at debug level
//! and otherwise ignored.

use std::collections::{HashMap, HashSet};

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::render::FurnitureInstance;
use crate::systems::{bubble_system, character_system, powered_furniture, spawn_ordered};
use officesim_logic::catalog;
use officesim_logic::character::TickContext;
use officesim_logic::config::OfficeConfig;
use officesim_logic::constants::{hit, TILE_SIZE};
use officesim_logic::grid::GridPos;
use officesim_logic::layout::{default_layout, Layout};
use officesim_logic::pathfinding::find_path;
use officesim_logic::seats::{Seat, SeatRegistry};
use officesim_logic::tilemap::{blocked_tiles, is_walkable, walkable_tiles, TileMap};

/// Seat preference of a primary agent, as remembered across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: AgentId,
    pub palette: u8,
    pub seat_id: Option<String>,
}

pub struct OfficeState {
    /// ECS world containing one entity per avatar
    pub world: World,
    pub(crate) layout: Layout,
    pub(crate) map: TileMap,
    pub(crate) blocked: HashSet<GridPos>,
    pub(crate) walkable: Vec<GridPos>,
    pub(crate) seats: SeatRegistry,
    /// Render list, sorted by depth
    pub(crate) furniture: Vec<FurnitureInstance>,
    pub(crate) selected_agent: Option<AgentId>,
    pub(crate) hovered_agent: Option<AgentId>,
    agents: HashMap<AgentId, Entity>,
    subagents: HashMap<(AgentId, String), AgentId>,
    next_subagent_id: AgentId,
    next_palette: u8,
    next_spawn: u64,
    config: OfficeConfig,
    rng: StdRng,
}

/// Snap onto a seat and settle into the state matching activity.
fn seat_character(ch: &mut Character, seat: &Seat) {
    ch.sit_at(seat);
    let state = if ch.is_active {
        CharacterState::Type
    } else {
        CharacterState::Idle
    };
    ch.set_state(state);
}

impl OfficeState {
    pub fn new(layout: Layout, config: OfficeConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut office = Self {
            world: World::new(),
            layout,
            map: TileMap::default(),
            blocked: HashSet::new(),
            walkable: Vec::new(),
            seats: SeatRegistry::default(),
            furniture: Vec::new(),
            selected_agent: None,
            hovered_agent: None,
            agents: HashMap::new(),
            subagents: HashMap::new(),
            next_subagent_id: -1,
            next_palette: 0,
            next_spawn: 0,
            config,
            rng,
        };
        office.rebuild();
        office
    }

    pub fn with_default_layout(config: OfficeConfig) -> Self {
        Self::new(default_layout(), config)
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn tile_map(&self) -> &TileMap {
        &self.map
    }

    pub fn blocked(&self) -> &HashSet<GridPos> {
        &self.blocked
    }

    pub fn walkable(&self) -> &[GridPos] {
        &self.walkable
    }

    pub fn seats(&self) -> &SeatRegistry {
        &self.seats
    }

    pub fn furniture(&self) -> &[FurnitureInstance] {
        &self.furniture
    }

    pub fn config(&self) -> &OfficeConfig {
        &self.config
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// All agent ids, ascending.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<_> = self.agents.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains_agent(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    pub fn entity(&self, id: AgentId) -> Option<Entity> {
        self.agents.get(&id).copied()
    }

    pub fn character(&self, id: AgentId) -> Option<hecs::Ref<'_, Character>> {
        let entity = self.entity(id)?;
        self.world.get::<&Character>(entity).ok()
    }

    pub fn bubble(&self, id: AgentId) -> Option<Bubble> {
        let entity = self.entity(id)?;
        self.world.get::<&Bubble>(entity).ok().map(|b| *b)
    }

    pub fn subagent_id(&self, parent_agent_id: AgentId, parent_tool_id: &str) -> Option<AgentId> {
        self.subagents
            .get(&(parent_agent_id, parent_tool_id.to_string()))
            .copied()
    }

    pub fn selected_agent(&self) -> Option<AgentId> {
        self.selected_agent
    }

    pub fn hovered_agent(&self) -> Option<AgentId> {
        self.hovered_agent
    }

    /// Select an agent; unknown ids clear the selection.
    pub fn select_agent(&mut self, id: Option<AgentId>) {
        self.selected_agent = id.filter(|id| self.agents.contains_key(id));
    }

    pub fn set_hovered_agent(&mut self, id: Option<AgentId>) {
        self.hovered_agent = id.filter(|id| self.agents.contains_key(id));
    }

    // ── Layout ─────────────────────────────────────────────────────────

    /// Swap in a new layout and recompute everything derived from it.
    /// Characters survive: a character whose seat still exists keeps it,
    /// everyone else is re-seated in spawn order or left standing.
    pub fn rebuild_from_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.map = TileMap::from_layout(&self.layout);
        self.blocked = blocked_tiles(&self.layout);
        self.walkable = walkable_tiles(&self.map, &self.blocked);
        self.seats = SeatRegistry::from_layout(&self.layout, &self.map, &self.blocked);

        let order = spawn_ordered(&self.world);
        let mut unseated = Vec::new();
        for &entity in &order {
            let Ok(mut ch) = self.world.get::<&mut Character>(entity) else {
                continue;
            };
            let kept = ch.seat_id.clone().filter(|uid| self.seats.claim(uid));
            match kept.as_deref().and_then(|uid| self.seats.get(uid)) {
                Some(seat) => seat_character(&mut ch, seat),
                None => {
                    ch.seat_id = None;
                    unseated.push(entity);
                }
            }
        }

        for entity in unseated {
            let Ok(mut ch) = self.world.get::<&mut Character>(entity) else {
                continue;
            };
            let free = self.seats.first_free().map(|s| s.uid.clone());
            match free {
                Some(uid) => {
                    self.seats.claim(&uid);
                    if let Some(seat) = self.seats.get(&uid) {
                        seat_character(&mut ch, seat);
                    }
                    ch.seat_id = Some(uid);
                }
                None => {
                    let here = ch.pos();
                    let spot = if is_walkable(&self.map, &self.blocked, here) {
                        Some(here)
                    } else {
                        self.walkable.choose(&mut self.rng).copied()
                    };
                    ch.snap_to(spot.unwrap_or(here));
                    if ch.state == CharacterState::Walk {
                        ch.set_state(CharacterState::Idle);
                    }
                }
            }
        }

        self.rebuild_furniture();
        self.refresh_power();
        log::info!(
            "Layout rebuilt: {}x{} grid, {} seats, {} walkable tiles, {} agents",
            self.layout.cols,
            self.layout.rows,
            self.seats.len(),
            self.walkable.len(),
            self.agents.len()
        );
    }

    fn rebuild_furniture(&mut self) {
        self.furniture = self
            .layout
            .furniture
            .iter()
            .filter_map(|item| {
                let entry = catalog::lookup(&item.kind)?;
                Some(FurnitureInstance {
                    uid: item.uid.clone(),
                    kind: entry.kind,
                    sprite: entry.sprite,
                    x: item.col as f32 * TILE_SIZE,
                    y: item.row as f32 * TILE_SIZE,
                    z: (item.row + entry.footprint_h as i32) as f32 * TILE_SIZE,
                    powered: false,
                })
            })
            .collect();
        self.furniture.sort_by(|a, b| a.z.total_cmp(&b.z));
    }

    fn refresh_power(&mut self) {
        let powered = powered_furniture(&self.world, &self.layout, &self.seats, &self.config);
        for item in &mut self.furniture {
            item.powered = powered.contains(&item.uid);
            if let Some(entry) = catalog::lookup(item.kind) {
                item.sprite = entry.sprite_for(item.powered);
            }
        }
    }

    // ── Agents ─────────────────────────────────────────────────────────

    fn next_palette(&mut self) -> u8 {
        let count = self.config.palette_count.max(1);
        let palette = self.next_palette % count;
        self.next_palette = (palette + 1) % count;
        palette
    }

    fn random_walkable(&mut self) -> GridPos {
        self.walkable
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(GridPos::new(0, 0))
    }

    fn nearest_walkable(&self, pos: GridPos) -> Option<GridPos> {
        self.walkable.iter().copied().min_by_key(|p| p.manhattan(pos))
    }

    /// Add an agent. Takes `preferred_seat` if it is free, otherwise the
    /// first free seat, otherwise stands on a random walkable cell.
    pub fn add_agent(&mut self, id: AgentId, palette: Option<u8>, preferred_seat: Option<&str>) {
        if self.agents.contains_key(&id) {
            log::debug!("add_agent: agent {} already present", id);
            return;
        }
        let palette = palette.unwrap_or_else(|| self.next_palette());
        let seat = preferred_seat
            .filter(|uid| self.seats.is_free(uid))
            .map(str::to_string)
            .or_else(|| self.seats.first_free().map(|s| s.uid.clone()));
        let spawn = self.random_walkable();
        self.spawn_character(id, palette, seat, spawn, None);
    }

    fn spawn_character(
        &mut self,
        id: AgentId,
        palette: u8,
        seat: Option<String>,
        spawn: GridPos,
        link: Option<SubagentLink>,
    ) {
        let seat = seat.filter(|uid| self.seats.claim(uid));
        let seat_ref = seat.as_deref().and_then(|uid| self.seats.get(uid));
        let mut ch = Character::new(id, palette, spawn, seat_ref);
        ch.parent_agent_id = link.as_ref().map(|l| l.parent_agent_id);

        let order = SpawnOrder(self.next_spawn);
        self.next_spawn += 1;
        let entity = match link {
            Some(link) => self.world.spawn((ch, order, link)),
            None => self.world.spawn((ch, order)),
        };
        self.agents.insert(id, entity);
        log::info!(
            "Agent {} added (palette {}, seat {})",
            id,
            palette,
            seat.as_deref().unwrap_or("none")
        );
        self.refresh_power();
    }

    /// Remove an agent and free its seat.
    pub fn remove_agent(&mut self, id: AgentId) {
        let Some(entity) = self.agents.remove(&id) else {
            log::debug!("remove_agent: unknown agent {}", id);
            return;
        };
        if let Ok(ch) = self.world.get::<&Character>(entity) {
            if let Some(uid) = ch.seat_id.as_deref() {
                self.seats.release(uid);
            }
        }
        self.world.despawn(entity).ok();
        self.subagents.retain(|_, sub| *sub != id);
        if self.selected_agent == Some(id) {
            self.selected_agent = None;
        }
        if self.hovered_agent == Some(id) {
            self.hovered_agent = None;
        }
        log::info!("Agent {} removed", id);
        self.refresh_power();
    }

    /// Spawn (or find) the sub-agent for a parent's tool call. Sub-agents
    /// share the parent's palette and sit as close to the parent as they can.
    pub fn add_subagent(&mut self, parent_agent_id: AgentId, parent_tool_id: &str) -> AgentId {
        let key = (parent_agent_id, parent_tool_id.to_string());
        if let Some(&id) = self.subagents.get(&key) {
            return id;
        }

        let mut id = self.next_subagent_id;
        while self.agents.contains_key(&id) {
            id -= 1;
        }
        self.next_subagent_id = id - 1;

        let parent = self
            .entity(parent_agent_id)
            .and_then(|e| self.world.get::<&Character>(e).ok())
            .map(|ch| (ch.palette, ch.pos()));
        let (palette, seat, spawn) = match parent {
            Some((palette, near)) => (
                palette,
                self.seats.closest_free(near).map(|s| s.uid.clone()),
                self.nearest_walkable(near).unwrap_or(near),
            ),
            None => {
                let palette = self.next_palette();
                let seat = self.seats.first_free().map(|s| s.uid.clone());
                (palette, seat, self.random_walkable())
            }
        };

        let link = SubagentLink {
            parent_agent_id,
            parent_tool_id: parent_tool_id.to_string(),
        };
        self.spawn_character(id, palette, seat, spawn, Some(link));
        self.subagents.insert(key, id);
        id
    }

    pub fn remove_subagent(&mut self, parent_agent_id: AgentId, parent_tool_id: &str) {
        if let Some(id) = self.subagents.remove(&(parent_agent_id, parent_tool_id.to_string())) {
            self.remove_agent(id);
        }
    }

    pub fn remove_all_subagents(&mut self, parent_agent_id: AgentId) {
        let mut ids: Vec<AgentId> = self
            .subagents
            .iter()
            .filter(|((parent, _), _)| *parent == parent_agent_id)
            .map(|(_, &id)| id)
            .collect();
        ids.sort_unstable();
        for id in ids {
            self.remove_agent(id);
        }
    }

    /// Move an agent to another free seat.
    pub fn reassign_seat(&mut self, id: AgentId, seat_id: &str) {
        let Some(entity) = self.entity(id) else {
            log::debug!("reassign_seat: unknown agent {}", id);
            return;
        };
        if !self.seats.contains(seat_id) {
            log::debug!("reassign_seat: unknown seat {}", seat_id);
            return;
        }
        let current = match self.world.get::<&Character>(entity) {
            Ok(ch) => ch.seat_id.clone(),
            Err(_) => return,
        };
        if current.as_deref() == Some(seat_id) {
            self.send_to_seat(id);
            return;
        }
        if !self.seats.claim(seat_id) {
            log::debug!("reassign_seat: seat {} already taken", seat_id);
            return;
        }
        if let Some(old) = current {
            self.seats.release(&old);
        }
        if let Ok(mut ch) = self.world.get::<&mut Character>(entity) {
            ch.seat_id = Some(seat_id.to_string());
        }
        self.send_to_seat(id);
        self.refresh_power();
    }

    /// Walk an agent back to its recorded seat, or start typing if it is
    /// already standing on it.
    pub fn send_to_seat(&mut self, id: AgentId) {
        let Some(entity) = self.entity(id) else {
            return;
        };
        let Ok(mut ch) = self.world.get::<&mut Character>(entity) else {
            return;
        };
        let Some(seat) = ch.seat_id.as_deref().and_then(|uid| self.seats.get(uid)) else {
            return;
        };
        if ch.pos() == seat.pos() {
            ch.sit_at(seat);
            ch.set_state(CharacterState::Type);
            return;
        }
        let path = find_path(ch.pos(), seat.pos(), &self.map, &self.blocked);
        if !ch.start_walk(path) {
            // Unreachable for now; IDLE keeps retrying.
            ch.set_state(CharacterState::Idle);
        }
    }

    pub fn set_agent_active(&mut self, id: AgentId, active: bool) {
        let Some(entity) = self.entity(id) else {
            log::debug!("set_agent_active: unknown agent {}", id);
            return;
        };
        if let Ok(mut ch) = self.world.get::<&mut Character>(entity) {
            ch.is_active = active;
        }
        self.refresh_power();
    }

    /// Current tool label; reading tools switch the typing pose to reading.
    pub fn set_agent_tool(&mut self, id: AgentId, tool: Option<&str>) {
        let Some(entity) = self.entity(id) else {
            return;
        };
        if let Ok(mut ch) = self.world.get::<&mut Character>(entity) {
            ch.current_tool = tool.map(str::to_string);
        }
    }

    // ── Bubbles ────────────────────────────────────────────────────────

    pub fn show_permission_bubble(&mut self, id: AgentId) {
        if let Some(entity) = self.entity(id) {
            self.world.insert_one(entity, Bubble::permission()).ok();
        }
    }

    pub fn clear_permission_bubble(&mut self, id: AgentId) {
        let Some(entity) = self.entity(id) else {
            return;
        };
        if self.bubble(id).map(|b| b.kind) == Some(BubbleKind::Permission) {
            self.world.remove_one::<Bubble>(entity).ok();
        }
    }

    pub fn show_waiting_bubble(&mut self, id: AgentId) {
        if let Some(entity) = self.entity(id) {
            let bubble = Bubble::waiting(self.config.waiting_bubble_duration);
            self.world.insert_one(entity, bubble).ok();
        }
    }

    /// Permission bubbles go away at once; waiting bubbles fade out fast.
    pub fn dismiss_bubble(&mut self, id: AgentId) {
        let Some(entity) = self.entity(id) else {
            return;
        };
        match self.bubble(id).map(|b| b.kind) {
            Some(BubbleKind::Permission) => {
                self.world.remove_one::<Bubble>(entity).ok();
            }
            Some(BubbleKind::Waiting) => {
                if let Ok(mut bubble) = self.world.get::<&mut Bubble>(entity) {
                    bubble.timer = bubble.timer.min(self.config.dismiss_fade_duration);
                }
            }
            None => {}
        }
    }

    // ── Tick & queries ─────────────────────────────────────────────────

    /// Advance the simulation by `delta_seconds`.
    pub fn update(&mut self, delta_seconds: f32) {
        let ctx = TickContext {
            map: &self.map,
            blocked: &self.blocked,
            walkable: &self.walkable,
            seats: &self.seats,
            config: &self.config,
        };
        character_system(&mut self.world, delta_seconds, &ctx, &mut self.rng);
        bubble_system(&mut self.world, delta_seconds);
        self.refresh_power();
    }

    /// Topmost character under a pixel. Characters lower on screen are
    /// drawn in front and win overlapping hits.
    pub fn character_at(&self, x: f32, y: f32) -> Option<AgentId> {
        let mut candidates: Vec<(AgentId, f32, f32, bool)> = self
            .world
            .query::<&Character>()
            .iter()
            .map(|(_, ch)| (ch.id, ch.x, ch.y, ch.state == CharacterState::Type))
            .collect();
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));
        candidates
            .into_iter()
            .find(|&(_, cx, cy, sitting)| {
                let anchor_y = if sitting {
                    cy + hit::CHARACTER_SITTING_OFFSET_PX
                } else {
                    cy
                };
                x >= cx - hit::CHARACTER_HIT_HALF_WIDTH
                    && x <= cx + hit::CHARACTER_HIT_HALF_WIDTH
                    && y >= anchor_y - hit::CHARACTER_HIT_HEIGHT
                    && y <= anchor_y
            })
            .map(|(id, ..)| id)
    }

    /// Palette and seat of every primary agent, ascending by id.
    pub fn agent_records(&self) -> Vec<AgentRecord> {
        let mut records: Vec<AgentRecord> = self
            .world
            .query::<(&Character, Option<&SubagentLink>)>()
            .iter()
            .filter(|(_, (_, link))| link.is_none())
            .map(|(_, (ch, _))| AgentRecord {
                id: ch.id,
                palette: ch.palette,
                seat_id: ch.seat_id.clone(),
            })
            .collect();
        records.sort_by_key(|r| r.id);
        records
    }
}
