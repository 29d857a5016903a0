//! Read-along session management
//!
//! This module provides the `ReadAlongSession` abstraction that manages:
//! - The transcript view model for one pane
//! - Fetches and the single incremental stream against a `TranscriptSource`
//! - Cancellation of in-flight work when the content changes
//! - Publishing view snapshots to the host

mod config;
mod session;

pub use config::SessionConfig;
pub use session::{ReadAlongHandle, ReadAlongSession};
