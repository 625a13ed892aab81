//! Character state machine - IDLE / WALK / TYPE for one avatar.
//!
//! Transitions:
//! - TYPE → IDLE when the character is no longer active.
//! - IDLE → TYPE when active and either seatless or already on its seat.
//! - IDLE → WALK when active with a reachable seat, or when the wander
//!   timer of an inactive character expires and a random target is reachable.
//! - WALK → TYPE when the path runs out, the character is active, and it
//!   stands exactly on its seat.
//! - WALK → IDLE when the path runs out in any other case. An active,
//!   seatless character then types in place on the next tick.
//!
//! Movement interpolates between cell centers and snaps to the destination
//! center when a step completes, so no error accumulates across ticks.

use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::OfficeConfig;
use crate::constants::{is_reading_tool, movement, TILE_SIZE};
use crate::grid::{direction_between, tile_center, Direction, GridPos};
use crate::pathfinding::find_path;
use crate::seats::{Seat, SeatRegistry};
use crate::tilemap::TileMap;

/// Agent identifier. Primary agents are positive, sub-agents negative.
pub type AgentId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterState {
    Idle,
    Walk,
    Type,
}

/// What the renderer should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    Idle,
    Walk,
    Typing,
    Reading,
}

/// One avatar's simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: AgentId,
    pub state: CharacterState,
    pub dir: Direction,
    /// Continuous pixel position (cell center when at rest).
    pub x: f32,
    pub y: f32,
    pub tile_col: i32,
    pub tile_row: i32,
    /// Remaining steps, current cell excluded.
    pub path: VecDeque<GridPos>,
    /// Progress through the step toward `path[0]`, in [0, 1).
    pub move_progress: f32,
    /// Weak reference into the seat registry.
    pub seat_id: Option<String>,
    pub is_active: bool,
    pub palette: u8,
    pub current_tool: Option<String>,
    pub frame: u32,
    pub frame_timer: f32,
    pub wander_timer: f32,
    pub parent_agent_id: Option<AgentId>,
}

impl Character {
    /// A fresh, active character. Seated characters start typing on their
    /// seat; seatless ones start typing in place at `spawn`.
    pub fn new(id: AgentId, palette: u8, spawn: GridPos, seat: Option<&Seat>) -> Self {
        let mut ch = Self {
            id,
            state: CharacterState::Type,
            dir: Direction::Down,
            x: 0.0,
            y: 0.0,
            tile_col: spawn.col,
            tile_row: spawn.row,
            path: VecDeque::new(),
            move_progress: 0.0,
            seat_id: None,
            is_active: true,
            palette,
            current_tool: None,
            frame: 0,
            frame_timer: 0.0,
            wander_timer: 0.0,
            parent_agent_id: None,
        };
        match seat {
            Some(seat) => {
                ch.seat_id = Some(seat.uid.clone());
                ch.sit_at(seat);
            }
            None => ch.snap_to(spawn),
        }
        ch
    }

    pub fn pos(&self) -> GridPos {
        GridPos::new(self.tile_col, self.tile_row)
    }

    pub fn is_subagent(&self) -> bool {
        self.id < 0
    }

    pub fn pose(&self) -> Pose {
        match self.state {
            CharacterState::Idle => Pose::Idle,
            CharacterState::Walk => Pose::Walk,
            CharacterState::Type => match self.current_tool.as_deref() {
                Some(tool) if is_reading_tool(tool) => Pose::Reading,
                _ => Pose::Typing,
            },
        }
    }

    /// Place exactly on a cell center and drop any path.
    pub fn snap_to(&mut self, pos: GridPos) {
        let (x, y) = tile_center(pos);
        self.x = x;
        self.y = y;
        self.tile_col = pos.col;
        self.tile_row = pos.row;
        self.path.clear();
        self.move_progress = 0.0;
    }

    /// Snap onto a seat's cell, facing its desk.
    pub fn sit_at(&mut self, seat: &Seat) {
        self.snap_to(seat.pos());
        self.dir = seat.facing;
    }

    /// Follow `path` from the current cell. Empty paths are ignored.
    pub fn start_walk(&mut self, path: Vec<GridPos>) -> bool {
        if path.is_empty() {
            return false;
        }
        self.path = path.into();
        self.move_progress = 0.0;
        self.set_state(CharacterState::Walk);
        true
    }

    pub fn set_state(&mut self, state: CharacterState) {
        self.state = state;
        self.frame = 0;
        self.frame_timer = 0.0;
    }

    fn advance_frames(&mut self, duration: f32, count: u32) {
        if duration <= 0.0 || count == 0 || self.frame_timer < duration {
            return;
        }
        let steps = (self.frame_timer as f64 / duration as f64).floor();
        let frame = (self.frame as f64 + steps) % count as f64;
        self.frame = frame as u32;
        self.frame_timer = self.frame_timer.rem_euclid(duration);
    }
}

/// Read-only world state a character consults while updating.
pub struct TickContext<'a> {
    pub map: &'a TileMap,
    pub blocked: &'a HashSet<GridPos>,
    pub walkable: &'a [GridPos],
    pub seats: &'a SeatRegistry,
    pub config: &'a OfficeConfig,
}

impl<'a> TickContext<'a> {
    fn seat_of(&self, ch: &Character) -> Option<&'a Seat> {
        ch.seat_id.as_deref().and_then(|uid| self.seats.get(uid))
    }

    fn path_to(&self, from: GridPos, to: GridPos) -> Vec<GridPos> {
        find_path(from, to, self.map, self.blocked)
    }
}

fn random_pause<R: Rng + ?Sized>(config: &OfficeConfig, rng: &mut R) -> f32 {
    let (lo, hi) = config.wander_range();
    rng.gen_range(lo..=hi)
}

/// Advance one character by `dt` seconds.
pub fn update_character<R: Rng + ?Sized>(
    ch: &mut Character,
    dt: f32,
    ctx: &TickContext<'_>,
    rng: &mut R,
) {
    // Clock glitches (NaN, infinities, negative steps) count as no time.
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
    ch.frame_timer += dt;
    match ch.state {
        CharacterState::Type => update_typing(ch, ctx, rng),
        CharacterState::Idle => update_idle(ch, dt, ctx, rng),
        CharacterState::Walk => update_walking(ch, dt, ctx, rng),
    }
}

fn update_typing<R: Rng + ?Sized>(ch: &mut Character, ctx: &TickContext<'_>, rng: &mut R) {
    ch.advance_frames(ctx.config.type_frame_duration, movement::TYPE_FRAME_COUNT);
    if !ch.is_active {
        ch.set_state(CharacterState::Idle);
        ch.wander_timer = random_pause(ctx.config, rng);
    }
}

fn update_idle<R: Rng + ?Sized>(ch: &mut Character, dt: f32, ctx: &TickContext<'_>, rng: &mut R) {
    ch.frame = 0;
    ch.frame_timer = 0.0;

    if ch.is_active {
        let Some(seat) = ctx.seat_of(ch) else {
            // No desk available: work where we stand.
            ch.set_state(CharacterState::Type);
            return;
        };
        if ch.pos() == seat.pos() {
            ch.sit_at(seat);
            ch.set_state(CharacterState::Type);
            return;
        }
        // Unreachable seats leave the character idle; it retries next tick.
        ch.start_walk(ctx.path_to(ch.pos(), seat.pos()));
        return;
    }

    ch.wander_timer -= dt;
    if ch.wander_timer > 0.0 {
        return;
    }
    if let Some(&target) = ctx.walkable.choose(rng) {
        ch.start_walk(ctx.path_to(ch.pos(), target));
    }
    ch.wander_timer = random_pause(ctx.config, rng);
}

fn update_walking<R: Rng + ?Sized>(
    ch: &mut Character,
    dt: f32,
    ctx: &TickContext<'_>,
    rng: &mut R,
) {
    ch.advance_frames(ctx.config.walk_frame_duration, movement::WALK_FRAME_COUNT);

    let Some(&next) = ch.path.front() else {
        arrive(ch, ctx, rng);
        return;
    };

    let current = ch.pos();
    ch.dir = direction_between(current, next);
    ch.move_progress += (ctx.config.walk_speed / TILE_SIZE) * dt;

    let (fx, fy) = tile_center(current);
    let (tx, ty) = tile_center(next);
    if ch.move_progress >= 1.0 {
        ch.x = tx;
        ch.y = ty;
        ch.tile_col = next.col;
        ch.tile_row = next.row;
        ch.path.pop_front();
        ch.move_progress = 0.0;
    } else {
        ch.x = fx + (tx - fx) * ch.move_progress;
        ch.y = fy + (ty - fy) * ch.move_progress;
    }

    // Re-target at cell boundaries if the seat moved or changed under us.
    if ch.is_active && ch.move_progress == 0.0 {
        if let Some(seat) = ctx.seat_of(ch) {
            if ch.path.back() != Some(&seat.pos()) {
                let fresh = ctx.path_to(ch.pos(), seat.pos());
                if !fresh.is_empty() {
                    ch.path = fresh.into();
                }
            }
        }
    }
}

fn arrive<R: Rng + ?Sized>(ch: &mut Character, ctx: &TickContext<'_>, rng: &mut R) {
    ch.snap_to(ch.pos());
    if !ch.is_active {
        ch.set_state(CharacterState::Idle);
        ch.wander_timer = random_pause(ctx.config, rng);
        return;
    }
    match ctx.seat_of(ch) {
        Some(seat) if seat.pos() == ch.pos() => {
            ch.dir = seat.facing;
            ch.set_state(CharacterState::Type);
        }
        // IDLE seeks the seat again, or types in place when there is none.
        _ => ch.set_state(CharacterState::Idle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::kinds;
    use crate::layout::{place_furniture, Layout, PlacedFurniture, TileKind};
    use crate::tilemap::{blocked_tiles, walkable_tiles};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct World {
        map: TileMap,
        blocked: HashSet<GridPos>,
        walkable: Vec<GridPos>,
        seats: SeatRegistry,
        config: OfficeConfig,
    }

    impl World {
        fn new(layout: &Layout) -> Self {
            let map = TileMap::from_layout(layout);
            let blocked = blocked_tiles(layout);
            let walkable = walkable_tiles(&map, &blocked);
            let seats = SeatRegistry::from_layout(layout, &map, &blocked);
            Self {
                map,
                blocked,
                walkable,
                seats,
                config: OfficeConfig::default(),
            }
        }

        fn ctx(&self) -> TickContext<'_> {
            TickContext {
                map: &self.map,
                blocked: &self.blocked,
                walkable: &self.walkable,
                seats: &self.seats,
                config: &self.config,
            }
        }

        fn run(&self, ch: &mut Character, ticks: usize, dt: f32, rng: &mut StdRng) {
            for _ in 0..ticks {
                update_character(ch, dt, &self.ctx(), rng);
            }
        }
    }

    fn desk_room() -> Layout {
        let layout = Layout::filled(10, 8, TileKind::TileFloor);
        place_furniture(&layout, PlacedFurniture::new("d", kinds::DESK, 4, 3)).into_owned()
    }

    #[test]
    fn test_new_seated_character_types_facing_desk() {
        let world = World::new(&desk_room());
        let seat = world.seats.get("d:top").unwrap();
        let ch = Character::new(1, 0, GridPos::new(0, 0), Some(seat));
        assert_eq!(ch.state, CharacterState::Type);
        assert_eq!(ch.pos(), seat.pos());
        assert_eq!(ch.dir, Direction::Down);
        assert_eq!((ch.x, ch.y), tile_center(seat.pos()));
    }

    #[test]
    fn test_type_to_idle_within_one_tick() {
        let world = World::new(&desk_room());
        let mut rng = StdRng::seed_from_u64(1);
        let mut ch = Character::new(1, 0, GridPos::new(0, 0), world.seats.get("d:top"));
        ch.is_active = false;
        update_character(&mut ch, 0.016, &world.ctx(), &mut rng);
        assert_eq!(ch.state, CharacterState::Idle);
        assert!(ch.wander_timer >= world.config.wander_pause_min);
    }

    #[test]
    fn test_active_seatless_types_in_place() {
        let world = World::new(&desk_room());
        let mut rng = StdRng::seed_from_u64(2);
        let mut ch = Character::new(1, 0, GridPos::new(1, 1), None);
        ch.set_state(CharacterState::Idle);
        update_character(&mut ch, 0.016, &world.ctx(), &mut rng);
        assert_eq!(ch.state, CharacterState::Type);
        assert_eq!(ch.pos(), GridPos::new(1, 1));
    }

    #[test]
    fn test_walks_to_seat_then_types() {
        let world = World::new(&desk_room());
        let mut rng = StdRng::seed_from_u64(3);
        let seat = world.seats.get("d:right").unwrap().clone();
        let mut ch = Character::new(1, 0, GridPos::new(0, 7), None);
        ch.seat_id = Some(seat.uid.clone());
        ch.set_state(CharacterState::Idle);

        update_character(&mut ch, 0.016, &world.ctx(), &mut rng);
        assert_eq!(ch.state, CharacterState::Walk);

        world.run(&mut ch, 2000, 0.016, &mut rng);
        assert_eq!(ch.state, CharacterState::Type);
        assert_eq!(ch.pos(), seat.pos());
        assert_eq!(ch.dir, seat.facing);
        assert_eq!((ch.x, ch.y), tile_center(seat.pos()));
    }

    #[test]
    fn test_step_snaps_without_drift() {
        let mut world = World::new(&Layout::filled(6, 1, TileKind::WoodFloor));
        // Keep the arrived character from wandering off before the checks.
        world.config.wander_pause_min = 100.0;
        world.config.wander_pause_max = 100.0;
        let mut rng = StdRng::seed_from_u64(4);
        let mut ch = Character::new(1, 0, GridPos::new(0, 0), None);
        ch.is_active = false;
        ch.start_walk(vec![GridPos::new(1, 0), GridPos::new(2, 0), GridPos::new(3, 0)]);

        // Irregular frame times.
        for dt in [0.013, 0.041, 0.007, 0.1, 0.033, 0.05, 0.021, 0.09, 0.06, 0.2, 0.011] {
            update_character(&mut ch, dt, &world.ctx(), &mut rng);
            if ch.move_progress == 0.0 {
                assert_eq!((ch.x, ch.y), tile_center(ch.pos()));
            }
        }
        world.run(&mut ch, 200, 0.016, &mut rng);
        assert_eq!(ch.pos(), GridPos::new(3, 0));
        assert_eq!((ch.x, ch.y), tile_center(GridPos::new(3, 0)));
        assert_eq!(ch.state, CharacterState::Idle);
    }

    #[test]
    fn test_interpolates_mid_step() {
        let world = World::new(&Layout::filled(3, 1, TileKind::WoodFloor));
        let mut rng = StdRng::seed_from_u64(5);
        let mut ch = Character::new(1, 0, GridPos::new(0, 0), None);
        ch.is_active = false;
        ch.start_walk(vec![GridPos::new(1, 0)]);
        // 48 px/s over 16 px cells: a quarter step in 1/12 s.
        update_character(&mut ch, 1.0 / 12.0, &world.ctx(), &mut rng);
        assert!((ch.move_progress - 0.25).abs() < 1e-4);
        assert!((ch.x - (8.0 + 4.0)).abs() < 1e-3);
        assert_eq!(ch.dir, Direction::Right);
    }

    #[test]
    fn test_wander_restarts_timer_without_path() {
        // A single walkable cell: every wander target is the current cell.
        let world = World::new(&Layout::filled(1, 1, TileKind::Carpet));
        let mut rng = StdRng::seed_from_u64(6);
        let mut ch = Character::new(1, 0, GridPos::new(0, 0), None);
        ch.is_active = false;
        ch.set_state(CharacterState::Idle);
        ch.wander_timer = 0.01;
        update_character(&mut ch, 0.02, &world.ctx(), &mut rng);
        assert_eq!(ch.state, CharacterState::Idle);
        assert!(ch.wander_timer >= world.config.wander_pause_min);
    }

    #[test]
    fn test_wander_starts_walk() {
        let world = World::new(&Layout::filled(8, 8, TileKind::Carpet));
        let mut rng = StdRng::seed_from_u64(7);
        let mut ch = Character::new(1, 0, GridPos::new(4, 4), None);
        ch.is_active = false;
        ch.set_state(CharacterState::Idle);
        let mut walked = false;
        for _ in 0..20 {
            ch.wander_timer = 0.0;
            update_character(&mut ch, 0.016, &world.ctx(), &mut rng);
            if ch.state == CharacterState::Walk {
                walked = true;
                break;
            }
        }
        assert!(walked);
    }

    #[test]
    fn test_repaths_when_seat_changes_mid_walk() {
        let world = World::new(&desk_room());
        let mut rng = StdRng::seed_from_u64(8);
        let mut ch = Character::new(1, 0, GridPos::new(0, 0), None);
        ch.seat_id = Some("d:left".to_string());
        ch.set_state(CharacterState::Idle);
        update_character(&mut ch, 0.016, &world.ctx(), &mut rng);
        assert_eq!(ch.state, CharacterState::Walk);

        ch.seat_id = Some("d:bottom".to_string());
        world.run(&mut ch, 30, 0.016, &mut rng);
        let bottom = world.seats.get("d:bottom").unwrap().pos();
        assert_eq!(ch.path.back(), Some(&bottom));
        world.run(&mut ch, 2000, 0.016, &mut rng);
        assert_eq!(ch.pos(), bottom);
        assert_eq!(ch.state, CharacterState::Type);
    }

    #[test]
    fn test_active_walk_ending_off_seat_goes_idle() {
        let mut world = World::new(&desk_room());
        let mut rng = StdRng::seed_from_u64(9);
        let mut ch = Character::new(1, 0, GridPos::new(0, 0), None);
        ch.seat_id = Some("d:top".to_string());
        ch.start_walk(vec![GridPos::new(1, 0)]);
        // Seat vanishes from routing: block every neighbor of the seat cell.
        let seat = world.seats.get("d:top").unwrap().pos();
        world.blocked.insert(seat.offset(-1, 0));
        world.blocked.insert(seat.offset(1, 0));
        world.blocked.insert(seat.offset(0, -1));
        world.run(&mut ch, 40, 0.016, &mut rng);
        assert_eq!(ch.pos(), GridPos::new(1, 0));
        assert_eq!(ch.state, CharacterState::Idle);
    }

    #[test]
    fn test_typing_frames_slower_than_walking() {
        let world = World::new(&Layout::filled(30, 1, TileKind::WoodFloor));
        let mut rng = StdRng::seed_from_u64(10);
        let mut typist = Character::new(1, 0, GridPos::new(0, 0), None);
        typist.current_tool = Some("Edit".to_string());
        update_character(&mut typist, 0.31, &world.ctx(), &mut rng);
        assert_eq!(typist.frame, 1);
        assert_eq!(typist.pose(), Pose::Typing);
        typist.current_tool = Some("Read".to_string());
        assert_eq!(typist.pose(), Pose::Reading);

        let mut walker = Character::new(2, 0, GridPos::new(0, 0), None);
        walker.is_active = false;
        walker.start_walk((1..30).map(|c| GridPos::new(c, 0)).collect());
        update_character(&mut walker, 0.31, &world.ctx(), &mut rng);
        assert_eq!(walker.frame, 2);
        assert_eq!(walker.pose(), Pose::Walk);
    }

    #[test]
    fn test_active_seatless_walk_ends_idle_then_types() {
        let world = World::new(&Layout::filled(4, 1, TileKind::WoodFloor));
        let mut rng = StdRng::seed_from_u64(11);
        let mut ch = Character::new(1, 0, GridPos::new(0, 0), None);
        ch.start_walk(vec![GridPos::new(1, 0)]);
        world.run(&mut ch, 30, 0.05, &mut rng);
        assert_eq!(ch.pos(), GridPos::new(1, 0));
        assert!(ch.path.is_empty());

        // Path ran out on the previous tick: WALK settles into IDLE first.
        let mut walker = Character::new(2, 0, GridPos::new(0, 0), None);
        walker.start_walk(vec![GridPos::new(1, 0)]);
        update_character(&mut walker, 0.5, &world.ctx(), &mut rng);
        assert_eq!(walker.state, CharacterState::Walk);
        update_character(&mut walker, 0.016, &world.ctx(), &mut rng);
        assert_eq!(walker.state, CharacterState::Idle);
        update_character(&mut walker, 0.016, &world.ctx(), &mut rng);
        assert_eq!(walker.state, CharacterState::Type);
        assert_eq!(walker.pos(), GridPos::new(1, 0));
    }

    #[test]
    fn test_huge_dt_returns_promptly() {
        let world = World::new(&Layout::filled(4, 1, TileKind::WoodFloor));
        let mut rng = StdRng::seed_from_u64(12);
        let mut typist = Character::new(1, 0, GridPos::new(0, 0), None);
        update_character(&mut typist, 1.0e9, &world.ctx(), &mut rng);
        assert_eq!(typist.state, CharacterState::Type);
        assert!(typist.frame < movement::TYPE_FRAME_COUNT);
        assert!(typist.frame_timer >= 0.0 && typist.frame_timer < world.config.type_frame_duration);

        let mut walker = Character::new(2, 0, GridPos::new(0, 0), None);
        walker.is_active = false;
        walker.start_walk(vec![GridPos::new(1, 0), GridPos::new(2, 0)]);
        update_character(&mut walker, f32::MAX, &world.ctx(), &mut rng);
        assert!(walker.frame < movement::WALK_FRAME_COUNT);
        assert_eq!(walker.pos(), GridPos::new(1, 0));
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let world = World::new(&Layout::filled(4, 1, TileKind::WoodFloor));
        let mut rng = StdRng::seed_from_u64(13);
        let mut walker = Character::new(1, 0, GridPos::new(0, 0), None);
        walker.is_active = false;
        walker.start_walk(vec![GridPos::new(1, 0)]);
        for dt in [f32::NAN, f32::INFINITY, -1.0] {
            update_character(&mut walker, dt, &world.ctx(), &mut rng);
        }
        assert_eq!(walker.move_progress, 0.0);
        assert_eq!(walker.frame_timer, 0.0);
        assert_eq!((walker.x, walker.y), tile_center(GridPos::new(0, 0)));
    }
}
