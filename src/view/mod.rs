//! Transcript view model
//!
//! This module provides the `TranscriptViewModel` state machine that ties
//! together segment assembly, tokenization, highlight resolution and scroll
//! arbitration, plus the render types handed to the host view.

mod model;
mod render;
mod state;

pub use model::{Command, FetchPurpose, TranscriptViewModel};
pub use render::{render_timeline, RenderToken, ViewSnapshot};
pub use state::{Status, TranscriptState};
