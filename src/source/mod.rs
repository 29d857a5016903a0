//! Transcript sources
//!
//! A source answers two questions for a testimony:
//! - what transcript exists right now (`fetch_transcript`)
//! - what new segments arrive while one is being produced (`open_stream`)

mod message;
mod remote;
mod stream;

pub use message::{decode_message, StreamEvent, TranscriptInfo, TranscriptStatus};
pub use remote::RemoteTranscriptSource;
pub use stream::{StreamHandle, StreamSlot};

use crate::error::{FetchError, StreamError};
use futures::stream::BoxStream;

/// Raw channel payloads; decoding happens in the consumer so malformed
/// messages can be dropped one at a time
pub type TranscriptStream = BoxStream<'static, Vec<u8>>;

/// Where transcripts come from
///
/// Implementations:
/// - `RemoteTranscriptSource`: archive HTTP API + NATS channel
/// - test doubles in `tests/`
#[async_trait::async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the current transcript state for a testimony
    async fn fetch_transcript(&self, content_id: u64) -> Result<TranscriptInfo, FetchError>;

    /// Open the incremental channel for a testimony
    ///
    /// The returned stream ends when the channel closes; that may happen
    /// without a `complete` message and is not an error.
    async fn open_stream(&self, content_id: u64) -> Result<TranscriptStream, StreamError>;

    /// Get source name for logging
    fn name(&self) -> &str;
}
