use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identity of a segment, derived from its time span in whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentKey {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl SegmentKey {
    pub fn from_span(start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            start_ms: (start_seconds * 1000.0).round() as i64,
            end_ms: (end_seconds * 1000.0).round() as i64,
        }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_ms, self.end_ms)
    }
}

/// A timed chunk of transcribed text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Identity key (derived from the span)
    pub id: SegmentKey,

    /// Transcribed text
    pub text: String,

    /// Start of the span in media time
    pub start_seconds: f64,

    /// End of the span in media time (never before `start_seconds`)
    pub end_seconds: f64,
}

impl TranscriptSegment {
    /// Build a segment, swapping an inverted span so `start <= end` holds
    pub fn new(text: impl Into<String>, start_seconds: f64, end_seconds: f64) -> Self {
        let (start_seconds, end_seconds) = if start_seconds <= end_seconds {
            (start_seconds, end_seconds)
        } else {
            (end_seconds, start_seconds)
        };

        Self {
            id: SegmentKey::from_span(start_seconds, end_seconds),
            text: text.into(),
            start_seconds,
            end_seconds,
        }
    }

    /// The single segment used when a finished transcript has no timing of its own
    pub fn synthetic(text: impl Into<String>, duration_seconds: f64) -> Self {
        Self::new(text, 0.0, duration_seconds.max(0.0))
    }

    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Identity of a token: owning segment plus position within it
///
/// Serialized as `"{start_ms}-{end_ms}:{index}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TokenId {
    pub segment: SegmentKey,
    pub index: usize,
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment, self.index)
    }
}

impl From<TokenId> for String {
    fn from(id: TokenId) -> Self {
        id.to_string()
    }
}

impl FromStr for TokenId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid token id '{}'", s);

        let (key, index) = s.rsplit_once(':').ok_or_else(invalid)?;
        // The start may itself be negative, so look for the separator after it
        let split = key
            .get(1..)
            .and_then(|rest| rest.find('-'))
            .map(|i| i + 1)
            .ok_or_else(invalid)?;

        Ok(TokenId {
            segment: SegmentKey {
                start_ms: key[..split].parse().map_err(|_| invalid())?,
                end_ms: key[split + 1..].parse().map_err(|_| invalid())?,
            },
            index: index.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for TokenId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A word or whitespace unit with synthetic timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub id: TokenId,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub is_whitespace: bool,
}

impl WordToken {
    pub fn duration_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Anything with a media-time span
pub trait Timed {
    fn start_seconds(&self) -> f64;
    fn end_seconds(&self) -> f64;
}

impl Timed for TranscriptSegment {
    fn start_seconds(&self) -> f64 {
        self.start_seconds
    }

    fn end_seconds(&self) -> f64 {
        self.end_seconds
    }
}

impl Timed for WordToken {
    fn start_seconds(&self) -> f64 {
        self.start_seconds
    }

    fn end_seconds(&self) -> f64 {
        self.end_seconds
    }
}
