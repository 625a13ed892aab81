//! Pure simulation logic for the pixel office.
//!
//! Everything here works on plain data: layouts in, layouts out, one
//! character advanced per call. No ECS, no I/O beyond JSON text, no
//! rendering. The engine crate (`officesim-core`) owns the world and
//! drives these functions every frame.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Furniture kinds: footprints, sprites, seat slots |
//! | [`character`] | IDLE / WALK / TYPE state machine for one avatar |
//! | [`config`] | Tunable timings and seeding (`OfficeConfig`) |
//! | [`constants`] | Tile size, grid limits, animation and hit-test constants |
//! | [`editor`] | Edit tools, ghost preview, bounded undo/redo |
//! | [`grid`] | Cell coordinates, directions, pixel conversion |
//! | [`layout`] | Persisted layout model, pure edit operations, JSON format |
//! | [`pathfinding`] | BFS over the 4-connected walkable grid |
//! | [`seats`] | Seat registry derived from desks |
//! | [`tilemap`] | Tile map, blocked cells, walkable pool |

pub mod catalog;
pub mod character;
pub mod config;
pub mod constants;
pub mod editor;
pub mod grid;
pub mod layout;
pub mod pathfinding;
pub mod seats;
pub mod tilemap;
