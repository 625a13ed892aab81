//! Static furniture catalog - footprint, label, sprite, seat slots.
//!
//! Furniture kinds are plain strings so layouts written by a newer editor
//! still load: [`lookup`] returns `None` for kinds this build does not know,
//! and every call site treats that as "ignore this item".

use crate::grid::Direction;

/// Known furniture kind identifiers (the `type` field of placed furniture).
pub mod kinds {
    pub const DESK: &str = "desk";
    pub const BOOKSHELF: &str = "bookshelf";
    pub const PLANT: &str = "plant";
    pub const COOLER: &str = "cooler";
    pub const WHITEBOARD: &str = "whiteboard";
    pub const SOFA: &str = "sofa";
    pub const PC: &str = "pc";
    pub const LAMP: &str = "lamp";
}

/// Which side of a desk a seat sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl SeatSide {
    pub fn label(self) -> &'static str {
        match self {
            SeatSide::Top => "top",
            SeatSide::Bottom => "bottom",
            SeatSide::Left => "left",
            SeatSide::Right => "right",
        }
    }
}

/// A chair cell relative to the furniture anchor, facing back at the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatSlot {
    pub side: SeatSide,
    pub dc: i32,
    pub dr: i32,
    pub facing: Direction,
}

/// One catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub kind: &'static str,
    pub label: &'static str,
    pub footprint_w: u32,
    pub footprint_h: u32,
    pub sprite: &'static str,
    /// Sprite used while a seated, active character is working nearby.
    pub on_sprite: Option<&'static str>,
    pub seat_slots: &'static [SeatSlot],
}

impl CatalogEntry {
    pub fn generates_seats(&self) -> bool {
        !self.seat_slots.is_empty()
    }

    /// Sprite for the given power state.
    pub fn sprite_for(&self, powered: bool) -> &'static str {
        match (powered, self.on_sprite) {
            (true, Some(on)) => on,
            _ => self.sprite,
        }
    }
}

const DESK_SEATS: &[SeatSlot] = &[
    SeatSlot { side: SeatSide::Top, dc: 0, dr: -1, facing: Direction::Down },
    SeatSlot { side: SeatSide::Bottom, dc: 1, dr: 2, facing: Direction::Up },
    SeatSlot { side: SeatSide::Left, dc: -1, dr: 1, facing: Direction::Right },
    SeatSlot { side: SeatSide::Right, dc: 2, dr: 0, facing: Direction::Left },
];

/// Every furniture kind this build understands.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        kind: kinds::DESK,
        label: "Desk",
        footprint_w: 2,
        footprint_h: 2,
        sprite: "desk",
        on_sprite: Some("desk_on"),
        seat_slots: DESK_SEATS,
    },
    CatalogEntry {
        kind: kinds::BOOKSHELF,
        label: "Bookshelf",
        footprint_w: 1,
        footprint_h: 2,
        sprite: "bookshelf",
        on_sprite: None,
        seat_slots: &[],
    },
    CatalogEntry {
        kind: kinds::PLANT,
        label: "Plant",
        footprint_w: 1,
        footprint_h: 1,
        sprite: "plant",
        on_sprite: None,
        seat_slots: &[],
    },
    CatalogEntry {
        kind: kinds::COOLER,
        label: "Water Cooler",
        footprint_w: 1,
        footprint_h: 1,
        sprite: "cooler",
        on_sprite: None,
        seat_slots: &[],
    },
    CatalogEntry {
        kind: kinds::WHITEBOARD,
        label: "Whiteboard",
        footprint_w: 2,
        footprint_h: 1,
        sprite: "whiteboard",
        on_sprite: None,
        seat_slots: &[],
    },
    CatalogEntry {
        kind: kinds::SOFA,
        label: "Sofa",
        footprint_w: 2,
        footprint_h: 1,
        sprite: "sofa",
        on_sprite: None,
        seat_slots: &[],
    },
    CatalogEntry {
        kind: kinds::PC,
        label: "Computer",
        footprint_w: 1,
        footprint_h: 1,
        sprite: "pc",
        on_sprite: Some("pc_on"),
        seat_slots: &[],
    },
    CatalogEntry {
        kind: kinds::LAMP,
        label: "Lamp",
        footprint_w: 1,
        footprint_h: 1,
        sprite: "lamp",
        on_sprite: Some("lamp_on"),
        seat_slots: &[],
    },
];

/// Look up a furniture kind.
pub fn lookup(kind: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.kind == kind)
}

/// Footprint (width, height) of a kind, if known.
pub fn footprint(kind: &str) -> Option<(u32, u32)> {
    lookup(kind).map(|entry| (entry.footprint_w, entry.footprint_h))
}
