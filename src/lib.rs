pub mod config;
pub mod error;
pub mod http;
pub mod playback;
pub mod session;
pub mod source;
pub mod transcript;
pub mod view;

pub use config::Config;
pub use error::{EmptyState, FetchError, MalformedSegment, StreamError};
pub use http::{create_router, AppState};
pub use playback::{PlaybackSignal, ScrollArbiter, ScrollCommand, ScrollInput, Timeline};
pub use session::{ReadAlongHandle, ReadAlongSession, SessionConfig};
pub use source::{RemoteTranscriptSource, StreamEvent, TranscriptInfo, TranscriptSource};
pub use transcript::{SegmentAssembler, TranscriptSegment, WordToken};
pub use view::{Status, TranscriptViewModel, ViewSnapshot};
