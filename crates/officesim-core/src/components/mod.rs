//! Component definitions for the ECS simulation.
//!
//! Every avatar entity carries a [`Character`](officesim_logic::character::Character)
//! plus a [`SpawnOrder`]. Sub-agents also carry a [`SubagentLink`], and a
//! [`Bubble`] is attached only while one is showing.

mod agent;
mod bubble;

pub use agent::*;
pub use bubble::*;

pub use officesim_logic::character::{AgentId, Character, CharacterState, Pose};
