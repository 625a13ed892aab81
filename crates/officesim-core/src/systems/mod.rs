//! Systems - logic that operates on components

mod bubbles;
mod movement;
mod power;

pub use bubbles::*;
pub use movement::*;
pub use power::*;
