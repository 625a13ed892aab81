//! Auto-on heuristic - which furniture renders in its powered variant
//!
//! An active avatar sitting on its seat looks at a small window of cells in
//! front of it: `facing_depth` cells straight ahead, widened by `side_depth`
//! cells to each side. Any furniture with a powered sprite whose footprint
//! touches that window is switched on. Presentation only; nothing else reads it.

use std::collections::HashSet;

use hecs::World;

use crate::components::{Character, CharacterState};
use officesim_logic::catalog;
use officesim_logic::config::OfficeConfig;
use officesim_logic::grid::{Direction, GridPos};
use officesim_logic::layout::Layout;
use officesim_logic::seats::SeatRegistry;

/// Cells in front of a seated avatar at `pos` facing `dir`.
pub fn auto_on_cells(
    pos: GridPos,
    dir: Direction,
    facing_depth: i32,
    side_depth: i32,
) -> HashSet<GridPos> {
    let (dc, dr) = dir.offset();
    // Perpendicular axis.
    let (sc, sr) = (dr.abs(), dc.abs());
    let mut cells = HashSet::new();
    for depth in 1..=facing_depth {
        let ahead = pos.offset(dc * depth, dr * depth);
        for side in -side_depth..=side_depth {
            cells.insert(ahead.offset(sc * side, sr * side));
        }
    }
    cells
}

/// Uids of furniture that should draw powered this frame.
pub fn powered_furniture(
    world: &World,
    layout: &Layout,
    seats: &SeatRegistry,
    config: &OfficeConfig,
) -> HashSet<String> {
    let mut hot = HashSet::new();
    for (_, ch) in world.query::<&Character>().iter() {
        if !ch.is_active || ch.state != CharacterState::Type {
            continue;
        }
        let Some(seat) = ch.seat_id.as_deref().and_then(|uid| seats.get(uid)) else {
            continue;
        };
        if seat.pos() != ch.pos() {
            continue;
        }
        hot.extend(auto_on_cells(
            seat.pos(),
            seat.facing,
            config.auto_on_facing_depth,
            config.auto_on_side_depth,
        ));
    }
    if hot.is_empty() {
        return HashSet::new();
    }

    layout
        .furniture
        .iter()
        .filter(|item| catalog::lookup(&item.kind).is_some_and(|entry| entry.on_sprite.is_some()))
        .filter(|item| item.footprint_cells().iter().any(|cell| hot.contains(cell)))
        .map(|item| item.uid.clone())
        .collect()
}
