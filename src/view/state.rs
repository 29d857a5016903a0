use crate::transcript::{SegmentAssembler, WordToken};
use serde::{Deserialize, Serialize};

/// Lifecycle of a transcript view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Streaming,
    Available,
    Unavailable,
    Error,
}

/// Everything assembled for the current content identifier
#[derive(Debug, Default, Clone)]
pub struct TranscriptState {
    pub status: Status,

    /// Segments received or synthesized so far, in time order
    pub segments: SegmentAssembler,

    /// Word tokens derived from `segments`
    pub tokens: Vec<WordToken>,

    /// Plain-language message for the `Error` state
    pub error_message: Option<String>,

    /// `Streaming` sub-mode: the channel ended without a finished transcript
    pub streaming_ended: bool,
}

impl TranscriptState {
    pub fn loading() -> Self {
        Self {
            status: Status::Loading,
            ..Self::default()
        }
    }

    /// Short label for the host to display next to the transcript
    pub fn status_label(&self) -> &'static str {
        match self.status {
            Status::Idle => "",
            Status::Loading => "Loading transcript...",
            Status::Streaming if self.streaming_ended => {
                "Transcription is still processing. Showing the text received so far."
            }
            Status::Streaming => "Transcribing... text appears as it is processed.",
            Status::Available => "Transcript",
            Status::Unavailable => "A transcript is not available for this testimony.",
            Status::Error => "The transcript could not be loaded. Please try again.",
        }
    }
}
