//! Seat registry - chair cells derived from seat-generating furniture.
//!
//! Rebuilt from scratch on every layout change. The `assigned` flag is the
//! only shared-resource exclusion in the engine: a seat is claimed by at most
//! one character, and must be released before anyone else can claim it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::grid::{Direction, GridPos};
use crate::layout::Layout;
use crate::tilemap::{is_walkable, TileMap};

/// A chair cell next to a desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub uid: String,
    pub desk_uid: String,
    pub desk_col: i32,
    pub desk_row: i32,
    pub seat_col: i32,
    pub seat_row: i32,
    /// Points back at the desk.
    pub facing: Direction,
    pub assigned: bool,
}

impl Seat {
    pub fn pos(&self) -> GridPos {
        GridPos::new(self.seat_col, self.seat_row)
    }
}

/// All seats of the current layout, in desk order.
#[derive(Debug, Clone, Default)]
pub struct SeatRegistry {
    seats: Vec<Seat>,
    by_uid: HashMap<String, usize>,
}

impl SeatRegistry {
    /// Derive seats from a layout. A candidate cell is dropped when it is
    /// off-grid, a wall, covered by any footprint, or already taken by an
    /// earlier desk's seat.
    pub fn from_layout(layout: &Layout, map: &TileMap, blocked: &HashSet<GridPos>) -> Self {
        let mut registry = Self::default();
        let mut taken = HashSet::new();

        for desk in &layout.furniture {
            let Some(entry) = catalog::lookup(&desk.kind) else {
                continue;
            };
            for slot in entry.seat_slots {
                let pos = desk.anchor().offset(slot.dc, slot.dr);
                if !is_walkable(map, blocked, pos) || !taken.insert(pos) {
                    continue;
                }
                let seat = Seat {
                    uid: format!("{}:{}", desk.uid, slot.side.label()),
                    desk_uid: desk.uid.clone(),
                    desk_col: desk.col,
                    desk_row: desk.row,
                    seat_col: pos.col,
                    seat_row: pos.row,
                    facing: slot.facing,
                    assigned: false,
                };
                registry.by_uid.insert(seat.uid.clone(), registry.seats.len());
                registry.seats.push(seat);
            }
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter()
    }

    pub fn get(&self, uid: &str) -> Option<&Seat> {
        self.by_uid.get(uid).map(|&i| &self.seats[i])
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.by_uid.contains_key(uid)
    }

    pub fn is_free(&self, uid: &str) -> bool {
        self.get(uid).is_some_and(|s| !s.assigned)
    }

    /// Seat whose chair sits on `pos`.
    pub fn at(&self, pos: GridPos) -> Option<&Seat> {
        self.seats.iter().find(|s| s.pos() == pos)
    }

    /// First unassigned seat in registry order.
    pub fn first_free(&self) -> Option<&Seat> {
        self.seats.iter().find(|s| !s.assigned)
    }

    /// Unassigned seat nearest `pos` (Manhattan); ties go to registry order.
    pub fn closest_free(&self, pos: GridPos) -> Option<&Seat> {
        self.seats
            .iter()
            .filter(|s| !s.assigned)
            .min_by_key(|s| s.pos().manhattan(pos))
    }

    /// Mark a free seat as taken. Returns false if unknown or already taken.
    pub fn claim(&mut self, uid: &str) -> bool {
        match self.by_uid.get(uid) {
            Some(&i) if !self.seats[i].assigned => {
                self.seats[i].assigned = true;
                true
            }
            _ => false,
        }
    }

    /// Mark a seat as free. Unknown uids are ignored.
    pub fn release(&mut self, uid: &str) {
        if let Some(&i) = self.by_uid.get(uid) {
            self.seats[i].assigned = false;
        }
    }

    pub fn free_count(&self) -> usize {
        self.seats.iter().filter(|s| !s.assigned).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::kinds;
    use crate::layout::{default_layout, place_furniture, PlacedFurniture, TileKind};
    use crate::tilemap::blocked_tiles;

    fn registry_for(layout: &Layout) -> SeatRegistry {
        let map = TileMap::from_layout(layout);
        SeatRegistry::from_layout(layout, &map, &blocked_tiles(layout))
    }

    fn room_with_desk(col: i32, row: i32) -> Layout {
        let layout = Layout::filled(8, 8, TileKind::TileFloor);
        place_furniture(&layout, PlacedFurniture::new("d", kinds::DESK, col, row)).into_owned()
    }

    #[test]
    fn test_desk_generates_four_seats() {
        let seats = registry_for(&room_with_desk(3, 3));
        assert_eq!(seats.len(), 4);
        let top = seats.get("d:top").unwrap();
        assert_eq!((top.seat_col, top.seat_row, top.facing), (3, 2, Direction::Down));
        let left = seats.get("d:left").unwrap();
        assert_eq!((left.seat_col, left.seat_row, left.facing), (2, 4, Direction::Right));
        assert!(seats.iter().all(|s| !s.assigned));
    }

    #[test]
    fn test_seats_face_their_desk() {
        let layout = room_with_desk(3, 3);
        let desk = &layout.furniture[0];
        for seat in registry_for(&layout).iter() {
            assert!(desk.covers(seat.pos().step(seat.facing)), "{}", seat.uid);
        }
    }

    #[test]
    fn test_out_of_bounds_seats_dropped() {
        let seats = registry_for(&room_with_desk(0, 0));
        assert!(seats.get("d:top").is_none());
        assert!(seats.get("d:left").is_none());
        assert_eq!(seats.len(), 2);
    }

    #[test]
    fn test_blocked_and_wall_seats_dropped() {
        let mut layout = room_with_desk(3, 3);
        // Plant on the top chair cell, wall on the right chair cell.
        layout = place_furniture(&layout, PlacedFurniture::new("p", kinds::PLANT, 3, 2))
            .into_owned();
        layout.tiles[3 * 8 + 5] = TileKind::Wall;
        let seats = registry_for(&layout);
        assert!(seats.get("d:top").is_none());
        assert!(seats.get("d:right").is_none());
        assert_eq!(seats.len(), 2);
    }

    #[test]
    fn test_unknown_furniture_ignored() {
        let mut layout = room_with_desk(3, 3);
        layout.furniture.push(PlacedFurniture::new("x", "holo_desk", 0, 0));
        assert_eq!(registry_for(&layout).len(), 4);
    }

    #[test]
    fn test_claim_release() {
        let mut seats = registry_for(&room_with_desk(3, 3));
        assert!(seats.claim("d:top"));
        assert!(!seats.claim("d:top"));
        assert!(!seats.claim("missing"));
        assert!(!seats.is_free("d:top"));
        assert_eq!(seats.first_free().map(|s| s.uid.as_str()), Some("d:bottom"));
        seats.release("d:top");
        assert!(seats.is_free("d:top"));
        assert_eq!(seats.free_count(), 4);
    }

    #[test]
    fn test_closest_free() {
        let seats = registry_for(&room_with_desk(3, 3));
        // Right seat is at (5,3).
        assert_eq!(seats.closest_free(GridPos::new(7, 3)).map(|s| s.uid.as_str()), Some("d:right"));
        assert_eq!(seats.at(GridPos::new(4, 5)).map(|s| s.uid.as_str()), Some("d:bottom"));
    }

    #[test]
    fn test_default_layout_seats_are_unique_cells() {
        let seats = registry_for(&default_layout());
        assert_eq!(seats.len(), 24);
        let cells: HashSet<_> = seats.iter().map(|s| s.pos()).collect();
        assert_eq!(cells.len(), seats.len());
    }
}
