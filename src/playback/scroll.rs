use crate::transcript::TokenId;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default window after a manual scroll during which autoscroll stays off
pub const DEFAULT_SUPPRESSION: Duration = Duration::from_millis(1500);

/// Scroll-related input reported by the host
///
/// The host tags viewport movement caused by executing a `ScrollCommand` as
/// `AutoScroll`; every other channel is treated as manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollInput {
    Wheel,
    TouchMove,
    /// Scrollbar drag, keyboard, or any other scroll event
    Scroll,
    /// Echo of our own auto-scroll
    AutoScroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAlign {
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
}

/// Request to bring a token into view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollCommand {
    pub token: TokenId,
    pub align: ScrollAlign,
    pub behavior: ScrollBehavior,
}

/// Last time the user scrolled by hand
///
/// Every input channel writes the same timestamp, so there is exactly one
/// debounce window regardless of how inputs interleave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollIntent {
    pub last_manual_scroll_at: Option<Instant>,
}

/// Decides when automatic scroll-to-highlight may run
#[derive(Debug, Clone)]
pub struct ScrollArbiter {
    intent: ScrollIntent,
    suppression: Duration,
    last_scrolled_to: Option<TokenId>,
}

impl Default for ScrollArbiter {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSION)
    }
}

impl ScrollArbiter {
    pub fn new(suppression: Duration) -> Self {
        Self {
            intent: ScrollIntent::default(),
            suppression,
            last_scrolled_to: None,
        }
    }

    pub fn intent(&self) -> ScrollIntent {
        self.intent
    }

    /// Record a scroll-related input event
    pub fn on_input(&mut self, input: ScrollInput, now: Instant) {
        if input == ScrollInput::AutoScroll {
            return;
        }

        debug!("Manual scroll ({:?}); autoscroll suppressed", input);
        self.intent.last_manual_scroll_at = Some(now);
        // A manual scroll moves the viewport away from whatever we scrolled to
        self.last_scrolled_to = None;
    }

    pub fn is_autoscroll_allowed(&self, now: Instant) -> bool {
        match self.intent.last_manual_scroll_at {
            None => true,
            Some(at) => now.saturating_duration_since(at) > self.suppression,
        }
    }

    /// Scroll command for this tick, if any
    pub fn next_scroll(
        &mut self,
        is_playing: bool,
        highlighted: Option<TokenId>,
        now: Instant,
    ) -> Option<ScrollCommand> {
        let token = highlighted?;
        if !is_playing || !self.is_autoscroll_allowed(now) {
            return None;
        }
        if self.last_scrolled_to == Some(token) {
            return None;
        }

        self.last_scrolled_to = Some(token);
        Some(ScrollCommand {
            token,
            align: ScrollAlign::Center,
            behavior: ScrollBehavior::Smooth,
        })
    }

    pub fn reset(&mut self) {
        self.intent = ScrollIntent::default();
        self.last_scrolled_to = None;
    }
}
