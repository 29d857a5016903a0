use thiserror::Error;

/// Failure fetching transcript metadata from the archive API
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport or server failure (connection refused, timeout, 5xx)
    #[error("network error: {0}")]
    Network(String),

    /// The content identifier does not exist upstream
    #[error("testimony {0} not found")]
    NotFound(u64),

    /// The response body could not be decoded
    #[error("invalid transcript response: {0}")]
    Decode(String),
}

/// Failure opening the incremental transcript stream
///
/// Once open, the stream only ends; it never reports errors of its own.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("failed to open transcript stream: {0}")]
    Open(String),
}

/// A stream message that could not be turned into a segment event
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MalformedSegment {
    #[error("message is not valid JSON: {0}")]
    NotJson(String),

    #[error("message has no recognised type")]
    UnknownType,

    #[error("segment is missing its text")]
    MissingText,

    #[error("segment field `{0}` is not a finite number")]
    InvalidTime(&'static str),

    #[error("segment ends before it starts ({start} > {end})")]
    Inverted { start: f64, end: f64 },
}

/// No transcript exists and none can be generated
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no transcript is available for testimony {content_id}")]
pub struct EmptyState {
    pub content_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_testimony() {
        assert_eq!(FetchError::NotFound(42).to_string(), "testimony 42 not found");
        assert_eq!(
            EmptyState { content_id: 7 }.to_string(),
            "no transcript is available for testimony 7"
        );
    }

    #[test]
    fn test_malformed_segment_reports_field() {
        assert_eq!(
            MalformedSegment::InvalidTime("start").to_string(),
            "segment field `start` is not a finite number"
        );
    }
}
