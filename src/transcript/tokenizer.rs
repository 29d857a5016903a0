use super::segment::{TokenId, TranscriptSegment, WordToken};

/// Derive word-level tokens with synthetic timing from every segment
///
/// There is no per-word timing upstream, so each segment's duration is split
/// equally across its words. Whitespace runs are kept as their own zero-width
/// tokens at the boundary between neighbouring words. A segment made only of
/// whitespace splits its duration across all of its runs instead.
///
/// The whole list is rebuilt on every call; transcripts are a few hundred
/// segments at most.
pub fn parse_segments_into_words(segments: &[TranscriptSegment]) -> Vec<WordToken> {
    let mut tokens = Vec::new();
    for segment in segments {
        tokenize_segment(segment, &mut tokens);
    }
    tokens
}

fn tokenize_segment(segment: &TranscriptSegment, out: &mut Vec<WordToken>) {
    let pieces = split_preserving_whitespace(&segment.text);
    if pieces.is_empty() {
        return;
    }

    let word_count = pieces.iter().filter(|(_, ws)| !ws).count();
    // Units that receive a share of the duration
    let (shares, whitespace_gets_share) = if word_count > 0 {
        (word_count, false)
    } else {
        (pieces.len(), true)
    };
    let per_share = segment.duration_seconds() / shares as f64;

    let mut cursor = segment.start_seconds;
    let mut remaining = shares;
    for (index, (text, is_whitespace)) in pieces.into_iter().enumerate() {
        let takes_share = !is_whitespace || whitespace_gets_share;
        let start = cursor;
        let end = if !takes_share {
            cursor
        } else {
            remaining -= 1;
            if remaining == 0 {
                segment.end_seconds
            } else {
                cursor + per_share
            }
        };
        cursor = end;

        out.push(WordToken {
            id: TokenId {
                segment: segment.id,
                index,
            },
            text: text.to_string(),
            start_seconds: start,
            end_seconds: end,
            is_whitespace,
        });
    }
}

/// Split into maximal runs of whitespace / non-whitespace characters
fn split_preserving_whitespace(text: &str) -> Vec<(&str, bool)> {
    let mut pieces = Vec::new();
    let mut run_start = 0;
    let mut run_is_ws: Option<bool> = None;

    for (i, ch) in text.char_indices() {
        let is_ws = ch.is_whitespace();
        match run_is_ws {
            Some(current) if current != is_ws => {
                pieces.push((&text[run_start..i], current));
                run_start = i;
                run_is_ws = Some(is_ws);
            }
            None => run_is_ws = Some(is_ws),
            _ => {}
        }
    }

    if let Some(current) = run_is_ws {
        pieces.push((&text[run_start..], current));
    }

    pieces
}
