use super::state::Status;
use crate::playback::Timeline;
use crate::transcript::{TokenId, WordToken};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One renderable unit of the transcript pane
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderToken {
    /// `None` for separators inserted between segments
    pub id: Option<TokenId>,
    pub text: String,
    pub is_highlighted: bool,
    pub is_clickable: bool,
    /// Seek target when clicked
    pub start_seconds: Option<f64>,
}

impl RenderToken {
    fn separator() -> Self {
        Self {
            id: None,
            text: " ".to_string(),
            is_highlighted: false,
            is_clickable: false,
            start_seconds: None,
        }
    }
}

/// Composed view state handed to the host
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub content_id: Option<u64>,
    pub status: Status,
    pub status_label: String,
    pub streaming_ended: bool,
    pub can_retry: bool,
    pub text: String,
    pub tokens: Vec<RenderToken>,
    pub highlighted: Option<TokenId>,
    pub updated_at: DateTime<Utc>,
}

/// Build render tokens for whichever timeline is active
pub fn render_timeline(timeline: Timeline<'_>, highlighted: Option<usize>) -> Vec<RenderToken> {
    match timeline {
        Timeline::Words(tokens) => render_words(tokens, highlighted),
        Timeline::Segments(segments) => {
            let mut out = Vec::with_capacity(segments.len() * 2);
            for (i, segment) in segments.iter().enumerate() {
                if i > 0 {
                    out.push(RenderToken::separator());
                }
                out.push(RenderToken {
                    id: Some(TokenId {
                        segment: segment.id,
                        index: 0,
                    }),
                    text: segment.text.clone(),
                    is_highlighted: highlighted == Some(i),
                    is_clickable: true,
                    start_seconds: Some(segment.start_seconds),
                });
            }
            out
        }
    }
}

fn render_words(tokens: &[WordToken], highlighted: Option<usize>) -> Vec<RenderToken> {
    let mut out = Vec::with_capacity(tokens.len() + 8);
    let mut previous: Option<&WordToken> = None;

    for (i, token) in tokens.iter().enumerate() {
        if let Some(prev) = previous {
            // Segments are joined by a single space unless one side already has one
            let new_segment = prev.id.segment != token.id.segment;
            if new_segment && !prev.is_whitespace && !token.is_whitespace {
                out.push(RenderToken::separator());
            }
        }

        out.push(RenderToken {
            id: Some(token.id),
            text: token.text.clone(),
            is_highlighted: highlighted == Some(i),
            is_clickable: !token.is_whitespace,
            start_seconds: Some(token.start_seconds),
        });
        previous = Some(token);
    }

    out
}
