//! OfficeSim Core - Pixel Office Simulation Engine
//!
//! An ECS-based office floor where every running coding agent is a little
//! worker: it walks to its desk, types while busy, wanders while idle, and
//! shows a bubble when it needs attention.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Agent characters (primary agents and their sub-agents)
//! - **Components**: Pure data attached to entities (Character, Bubble, SubagentLink)
//! - **Systems**: Logic that queries and updates components each frame
//!
//! Layout, seats and pathfinding are pure functions in `officesim-logic`;
//! [`office::OfficeState`] keeps them in sync with the world.
//!
//! # Example
//!
//! ```rust,no_run
//! use officesim_core::prelude::*;
//! use officesim_logic::config::OfficeConfig;
//!
//! let mut session = OfficeSession::new(OfficeConfig::default());
//! session.start(None);
//! session.handle(&AgentEvent::Created { id: 1 });
//!
//! loop {
//!     session.update(1.0 / 60.0); // 60 FPS
//!     if let Some(frame) = session.frame() {
//!         // draw frame.tiles, frame.furniture, frame.characters
//!         let _ = frame;
//!     }
//! }
//! ```

pub mod components;
pub mod systems;
pub mod office;
pub mod render;
pub mod events;
pub mod engine;
pub mod persistence;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::OfficeSession;
    pub use crate::events::AgentEvent;
    pub use crate::office::OfficeState;
}
