//! Integration tests over the default office and edited variants of it.
//!
//! Exercises: Layout → TileMap / blocked cells → SeatRegistry → BFS paths
//! → character ticks, the same pipeline the engine runs on every rebuild.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use officesim_logic::catalog::{self, kinds};
use officesim_logic::character::{update_character, Character, CharacterState, TickContext};
use officesim_logic::config::OfficeConfig;
use officesim_logic::grid::GridPos;
use officesim_logic::layout::{
    default_layout, deserialize_layout, expand_layout, move_furniture, place_furniture,
    serialize_layout, ExpandSide, Layout, PlacedFurniture,
};
use officesim_logic::pathfinding::{find_path, reachable_from};
use officesim_logic::seats::SeatRegistry;
use officesim_logic::tilemap::{blocked_tiles, is_walkable, walkable_tiles, TileMap};

// ── Helpers ────────────────────────────────────────────────────────────

struct Derived {
    map: TileMap,
    blocked: HashSet<GridPos>,
    walkable: Vec<GridPos>,
    seats: SeatRegistry,
}

fn derive(layout: &Layout) -> Derived {
    let map = TileMap::from_layout(layout);
    let blocked = blocked_tiles(layout);
    let walkable = walkable_tiles(&map, &blocked);
    let seats = SeatRegistry::from_layout(layout, &map, &blocked);
    Derived {
        map,
        blocked,
        walkable,
        seats,
    }
}

fn assert_valid_path(d: &Derived, start: GridPos, end: GridPos, path: &[GridPos]) {
    assert_eq!(path.last(), Some(&end));
    assert!(!path.contains(&start));
    let mut prev = start;
    for &cell in path {
        assert_eq!(prev.manhattan(cell), 1);
        assert!(is_walkable(&d.map, &d.blocked, cell));
        prev = cell;
    }
    let unique: HashSet<_> = path.iter().collect();
    assert_eq!(unique.len(), path.len());
}

// ── Default office ─────────────────────────────────────────────────────

#[test]
fn default_office_is_connected() {
    let d = derive(&default_layout());
    let reach = reachable_from(d.walkable[0], &d.map, &d.blocked);
    assert_eq!(reach.len(), d.walkable.len());
}

#[test]
fn every_seat_reachable_from_every_corner() {
    let layout = default_layout();
    let d = derive(&layout);
    let corners = [
        GridPos::new(1, 1),
        GridPos::new(1, layout.rows as i32 - 2),
        GridPos::new(layout.cols as i32 - 2, 1),
        GridPos::new(layout.cols as i32 - 2, layout.rows as i32 - 2),
    ];
    for start in corners.into_iter().filter(|&c| is_walkable(&d.map, &d.blocked, c)) {
        for seat in d.seats.iter() {
            let path = find_path(start, seat.pos(), &d.map, &d.blocked);
            assert!(!path.is_empty() || start == seat.pos(), "{} unreachable", seat.uid);
            if !path.is_empty() {
                assert_valid_path(&d, start, seat.pos(), &path);
                assert!(path.len() as u32 >= start.manhattan(seat.pos()));
            }
        }
    }
}

#[test]
fn seats_never_on_blocked_or_wall_cells() {
    let d = derive(&default_layout());
    for seat in d.seats.iter() {
        assert!(is_walkable(&d.map, &d.blocked, seat.pos()), "{}", seat.uid);
    }
}

#[test]
fn default_office_text_format_is_stable() {
    let layout = default_layout();
    let text = serialize_layout(&layout).unwrap();
    assert!(text.contains("\"type\":\"desk\""));
    assert!(text.contains("\"WOOD_FLOOR\""));
    assert_eq!(deserialize_layout(&text), Some(layout));
}

// ── Edited layouts ─────────────────────────────────────────────────────

#[test]
fn placements_never_overlap() {
    // Try every anchor for every catalog kind on top of the default office.
    let base = default_layout();
    for entry in catalog::CATALOG {
        for row in -1..base.rows as i32 + 1 {
            for col in -1..base.cols as i32 + 1 {
                let item = PlacedFurniture::new("probe", entry.kind, col, row);
                let next = place_furniture(&base, item);
                if next.furniture.len() == base.furniture.len() {
                    continue;
                }
                let mut cells = HashSet::new();
                for f in &next.furniture {
                    for cell in f.footprint_cells() {
                        assert!(next.in_bounds(cell));
                        assert!(cells.insert(cell), "{} overlaps at {:?}", entry.kind, cell);
                    }
                }
            }
        }
    }
}

#[test]
fn moving_a_desk_moves_its_seats() {
    let layout = default_layout();
    let moved = move_furniture(&layout, "desk-6", 16, 5).into_owned();
    let before = derive(&layout);
    let after = derive(&moved);
    let old_top = before.seats.get("desk-6:top").unwrap().pos();
    let new_top = after.seats.get("desk-6:top").unwrap().pos();
    assert_eq!(old_top.offset(0, 3), new_top);
}

#[test]
fn expanding_keeps_seat_identity() {
    let layout = default_layout();
    let grown = expand_layout(&layout, ExpandSide::Top).into_owned();
    let before = derive(&layout);
    let after = derive(&grown);
    for seat in before.seats.iter() {
        let shifted = after.seats.get(&seat.uid).map(|s| s.pos());
        assert_eq!(shifted, Some(seat.pos().offset(0, 1)), "{}", seat.uid);
    }
}

// ── Characters on the default office ───────────────────────────────────

#[test]
fn walkers_reach_their_seats() {
    let layout = default_layout();
    let d = derive(&layout);
    let config = OfficeConfig::seeded(7);
    let mut rng = StdRng::seed_from_u64(7);
    let ctx = TickContext {
        map: &d.map,
        blocked: &d.blocked,
        walkable: &d.walkable,
        seats: &d.seats,
        config: &config,
    };

    // Spawn everyone near the bottom of the left room, seated far away.
    let mut characters: Vec<Character> = d
        .seats
        .iter()
        .take(6)
        .enumerate()
        .map(|(i, seat)| {
            let mut ch = Character::new(i as i32 + 1, 0, GridPos::new(4, 9), None);
            ch.seat_id = Some(seat.uid.clone());
            ch.set_state(CharacterState::Idle);
            ch
        })
        .collect();

    for _ in 0..3000 {
        for ch in &mut characters {
            update_character(ch, 1.0 / 60.0, &ctx, &mut rng);
        }
    }
    for ch in &characters {
        let seat = d.seats.get(ch.seat_id.as_deref().unwrap()).unwrap();
        assert_eq!(ch.pos(), seat.pos(), "agent {}", ch.id);
        assert_eq!(ch.state, CharacterState::Type);
        assert_eq!(ch.dir, seat.facing);
    }
}

#[test]
fn wanderers_stay_on_walkable_cells() {
    let layout = default_layout();
    let d = derive(&layout);
    let mut config = OfficeConfig::seeded(11);
    config.wander_pause_min = 0.1;
    config.wander_pause_max = 0.5;
    let mut rng = StdRng::seed_from_u64(11);
    let ctx = TickContext {
        map: &d.map,
        blocked: &d.blocked,
        walkable: &d.walkable,
        seats: &d.seats,
        config: &config,
    };
    let mut ch = Character::new(1, 0, GridPos::new(4, 5), None);
    ch.is_active = false;
    ch.set_state(CharacterState::Idle);

    let mut visited = HashSet::new();
    for _ in 0..5000 {
        update_character(&mut ch, 1.0 / 30.0, &ctx, &mut rng);
        assert!(is_walkable(&d.map, &d.blocked, ch.pos()), "stood on {:?}", ch.pos());
        visited.insert(ch.pos());
    }
    assert!(visited.len() > 10);
    assert!(layout.furniture.iter().any(|f| f.kind == kinds::DESK));
}
