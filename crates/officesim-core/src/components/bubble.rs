//! Speech-bubble annotation shown above an avatar.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleKind {
    /// Agent is blocked on a permission prompt. Stays until cleared.
    Permission,
    /// Agent finished its turn. Fades out on its own.
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub kind: BubbleKind,
    /// Seconds left before a waiting bubble disappears. Unused for permission.
    pub timer: f32,
}

impl Bubble {
    pub fn permission() -> Self {
        Self {
            kind: BubbleKind::Permission,
            timer: 0.0,
        }
    }

    pub fn waiting(duration: f32) -> Self {
        Self {
            kind: BubbleKind::Waiting,
            timer: duration,
        }
    }

    /// Advance by `dt`. Returns false once the bubble should be removed.
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.kind {
            BubbleKind::Permission => true,
            BubbleKind::Waiting => {
                self.timer -= dt;
                self.timer > 0.0
            }
        }
    }
}
