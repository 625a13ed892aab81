//! Engine constants - grid geometry, movement and animation cadence, limits.
//!
//! Plain values with no runtime dependency. Tunable ones are mirrored on
//! [`OfficeConfig`](crate::config::OfficeConfig) and read from there at
//! runtime; the values here are the defaults.

/// Edge length of one grid cell in pixels.
pub const TILE_SIZE: f32 = 16.0;

/// Current textual layout format version.
pub const LAYOUT_VERSION: u32 = 1;

pub mod grid {
    pub const DEFAULT_COLS: u32 = 20;
    pub const DEFAULT_ROWS: u32 = 11;
    pub const MAX_COLS: u32 = 64;
    pub const MAX_ROWS: u32 = 64;
}

pub mod movement {
    /// Walking speed in pixels per second.
    pub const WALK_SPEED_PX_PER_SEC: f32 = 48.0;
    pub const WALK_FRAME_DURATION_SEC: f32 = 0.15;
    pub const TYPE_FRAME_DURATION_SEC: f32 = 0.3;
    pub const WALK_FRAME_COUNT: u32 = 4;
    pub const TYPE_FRAME_COUNT: u32 = 2;
    pub const WANDER_PAUSE_MIN_SEC: f32 = 2.0;
    pub const WANDER_PAUSE_MAX_SEC: f32 = 20.0;
}

pub mod bubbles {
    pub const WAITING_BUBBLE_DURATION_SEC: f32 = 2.0;
    pub const DISMISS_BUBBLE_FAST_FADE_SEC: f32 = 0.3;
}

pub mod hit {
    /// Characters render this many pixels lower while seated.
    pub const CHARACTER_SITTING_OFFSET_PX: f32 = 6.0;
    pub const CHARACTER_HIT_HALF_WIDTH: f32 = 8.0;
    pub const CHARACTER_HIT_HEIGHT: f32 = 24.0;
}

pub mod presentation {
    /// Cells scanned ahead of a seated, active character.
    pub const AUTO_ON_FACING_DEPTH: i32 = 3;
    /// Cells scanned to either side of that line.
    pub const AUTO_ON_SIDE_DEPTH: i32 = 1;
    pub const PALETTE_COUNT: u8 = 6;
}

pub mod editor {
    pub const UNDO_STACK_MAX_SIZE: usize = 50;
}

/// Tool labels that animate as reading instead of typing.
pub const READING_TOOLS: &[&str] = &["Read", "Grep", "Glob", "WebFetch", "WebSearch"];

/// Returns true if the tool label is a reading tool.
pub fn is_reading_tool(tool: &str) -> bool {
    READING_TOOLS.contains(&tool)
}
