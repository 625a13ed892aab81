//! Runtime tunables for the office simulation.
//!
//! `OfficeConfig` collects every value the engine treats as presentation
//! policy rather than an invariant. Defaults come from [`crate::constants`];
//! a host may override any subset from JSON since missing fields fall back
//! to their defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{bubbles, editor, movement, presentation};

/// Tunable simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    /// Walking speed in pixels per second.
    pub walk_speed: f32,
    pub walk_frame_duration: f32,
    pub type_frame_duration: f32,
    /// Idle pause range before a wander attempt, in seconds.
    pub wander_pause_min: f32,
    pub wander_pause_max: f32,
    pub waiting_bubble_duration: f32,
    pub dismiss_fade_duration: f32,
    pub auto_on_facing_depth: i32,
    pub auto_on_side_depth: i32,
    pub palette_count: u8,
    pub undo_capacity: usize,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            walk_speed: movement::WALK_SPEED_PX_PER_SEC,
            walk_frame_duration: movement::WALK_FRAME_DURATION_SEC,
            type_frame_duration: movement::TYPE_FRAME_DURATION_SEC,
            wander_pause_min: movement::WANDER_PAUSE_MIN_SEC,
            wander_pause_max: movement::WANDER_PAUSE_MAX_SEC,
            waiting_bubble_duration: bubbles::WAITING_BUBBLE_DURATION_SEC,
            dismiss_fade_duration: bubbles::DISMISS_BUBBLE_FAST_FADE_SEC,
            auto_on_facing_depth: presentation::AUTO_ON_FACING_DEPTH,
            auto_on_side_depth: presentation::AUTO_ON_SIDE_DEPTH,
            palette_count: presentation::PALETTE_COUNT,
            undo_capacity: editor::UNDO_STACK_MAX_SIZE,
            seed: None,
        }
    }
}

impl OfficeConfig {
    /// Parse a (possibly partial) JSON override.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Same config with a fixed RNG seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Wander pause range, tolerant of a reversed or degenerate min/max.
    pub fn wander_range(&self) -> (f32, f32) {
        let lo = self.wander_pause_min.max(0.0);
        let hi = self.wander_pause_max.max(lo);
        (lo, hi)
    }
}
