//! Playback synchronization
//!
//! Highlight resolution against the player's clock, and arbitration between
//! automatic and manual scrolling of the transcript pane.

mod highlight;
mod scroll;

pub use highlight::{resolve, Timeline};
pub use scroll::{
    ScrollAlign, ScrollArbiter, ScrollBehavior, ScrollCommand, ScrollInput, ScrollIntent,
    DEFAULT_SUPPRESSION,
};

use serde::{Deserialize, Serialize};

/// Clock reading from the media player; this crate never writes it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSignal {
    pub current_time_ms: u64,
    pub is_playing: bool,
}

impl PlaybackSignal {
    pub fn current_time_seconds(&self) -> f64 {
        self.current_time_ms as f64 / 1000.0
    }
}
