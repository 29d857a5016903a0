use crate::error::MalformedSegment;
use crate::transcript::TranscriptSegment;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generation status reported by the archive API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum TranscriptStatus {
    Pending,
    Processing,
    Available,
    /// Anything else the API reports (including nothing at all)
    Unknown(String),
}

impl TranscriptStatus {
    /// Whether a transcript is still being produced upstream
    pub fn is_in_progress(&self) -> bool {
        matches!(self, TranscriptStatus::Pending | TranscriptStatus::Processing)
    }
}

impl Default for TranscriptStatus {
    fn default() -> Self {
        TranscriptStatus::Unknown(String::new())
    }
}

impl From<Option<String>> for TranscriptStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("pending") => TranscriptStatus::Pending,
            Some(s) if s.eq_ignore_ascii_case("processing") => TranscriptStatus::Processing,
            Some(s) if s.eq_ignore_ascii_case("available") => TranscriptStatus::Available,
            Some(s) => TranscriptStatus::Unknown(s.to_string()),
            None => TranscriptStatus::default(),
        }
    }
}

impl From<TranscriptStatus> for Option<String> {
    fn from(status: TranscriptStatus) -> Self {
        match status {
            TranscriptStatus::Pending => Some("pending".to_string()),
            TranscriptStatus::Processing => Some("processing".to_string()),
            TranscriptStatus::Available => Some("available".to_string()),
            TranscriptStatus::Unknown(s) if s.is_empty() => None,
            TranscriptStatus::Unknown(s) => Some(s),
        }
    }
}

/// Transcript metadata returned by a fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptInfo {
    #[serde(default)]
    pub has_transcript: bool,

    #[serde(default)]
    pub transcript: Option<String>,

    #[serde(default)]
    pub transcript_status: TranscriptStatus,

    #[serde(default)]
    pub can_have_transcript: bool,

    #[serde(default)]
    pub has_media: bool,
}

impl TranscriptInfo {
    /// Whether opening a stream can produce anything
    pub fn can_stream(&self) -> bool {
        self.transcript_status.is_in_progress() && self.can_have_transcript && self.has_media
    }
}

/// One event on the incremental transcript channel
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Start,
    Segment(TranscriptSegment),
    Complete,
}

/// Decode one JSON message from the transcript channel
///
/// Shapes: `{"type":"start"}`, `{"type":"segment","text":..,"start":..,"end":..}`,
/// `{"type":"complete"}`. Segment times must be JSON numbers.
pub fn decode_message(payload: &[u8]) -> Result<StreamEvent, MalformedSegment> {
    let value: Value =
        serde_json::from_slice(payload).map_err(|e| MalformedSegment::NotJson(e.to_string()))?;

    match value.get("type").and_then(Value::as_str) {
        Some("start") => Ok(StreamEvent::Start),
        Some("complete") => Ok(StreamEvent::Complete),
        Some("segment") => decode_segment(&value).map(StreamEvent::Segment),
        _ => Err(MalformedSegment::UnknownType),
    }
}

fn decode_segment(value: &Value) -> Result<TranscriptSegment, MalformedSegment> {
    let text = value
        .get("text")
        .and_then(Value::as_str)
        .ok_or(MalformedSegment::MissingText)?;
    let start = finite_field(value, "start")?;
    let end = finite_field(value, "end")?;

    if start > end {
        return Err(MalformedSegment::Inverted { start, end });
    }

    Ok(TranscriptSegment::new(text, start, end))
}

fn finite_field(value: &Value, field: &'static str) -> Result<f64, MalformedSegment> {
    value
        .get(field)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
        .ok_or(MalformedSegment::InvalidTime(field))
}
