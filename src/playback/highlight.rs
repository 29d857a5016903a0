use crate::transcript::{Timed, TranscriptSegment, WordToken};

/// Units the transcript is rendered and highlighted in
///
/// Word tokens are the normal path; whole segments are the fallback when
/// tokenization produced nothing for the segments at hand.
#[derive(Debug, Clone, Copy)]
pub enum Timeline<'a> {
    Words(&'a [WordToken]),
    Segments(&'a [TranscriptSegment]),
}

impl<'a> Timeline<'a> {
    /// Pick words when there are any, segment blocks otherwise
    pub fn select(tokens: &'a [WordToken], segments: &'a [TranscriptSegment]) -> Self {
        if tokens.is_empty() && !segments.is_empty() {
            Timeline::Segments(segments)
        } else {
            Timeline::Words(tokens)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Timeline::Words(units) => units.len(),
            Timeline::Segments(units) => units.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the active unit at `current_time_seconds`
    pub fn resolve(&self, current_time_seconds: f64, is_playing: bool) -> Option<usize> {
        match self {
            Timeline::Words(units) => resolve(current_time_seconds, is_playing, units),
            Timeline::Segments(units) => resolve(current_time_seconds, is_playing, units),
        }
    }
}

/// Map a playback time to the first unit whose span contains it
///
/// Returns `None` before playback begins (`t <= 0`) and while paused. Boundary
/// ties go to the earlier unit. Linear, allocation free.
pub fn resolve<T: Timed>(current_time_seconds: f64, is_playing: bool, units: &[T]) -> Option<usize> {
    if !is_playing || current_time_seconds.is_nan() || current_time_seconds <= 0.0 {
        return None;
    }

    units.iter().position(|unit| {
        unit.start_seconds() <= current_time_seconds && current_time_seconds <= unit.end_seconds()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::parse_segments_into_words;

    fn hello_world_tokens() -> Vec<WordToken> {
        parse_segments_into_words(&[
            TranscriptSegment::new("Hello world", 0.0, 2.0),
            TranscriptSegment::new("how are you", 2.0, 4.0),
        ])
    }

    #[test]
    fn test_resolves_word_under_playhead() {
        let tokens = hello_world_tokens();
        let at = |t: f64| resolve(t, true, &tokens).map(|i| tokens[i].text.as_str());

        assert_eq!(at(0.5), Some("Hello"));
        assert_eq!(at(1.5), Some("world"));
        assert_eq!(at(3.9), Some("you"));
        assert_eq!(at(4.5), None);
    }

    #[test]
    fn test_boundary_tie_goes_to_earlier_token() {
        let tokens = hello_world_tokens();
        assert_eq!(resolve(1.0, true, &tokens), Some(0));
        assert_eq!(resolve(2.0, true, &tokens).map(|i| tokens[i].text.as_str()), Some("world"));
    }

    #[test]
    fn test_no_highlight_before_start_or_while_paused() {
        let tokens = hello_world_tokens();
        assert_eq!(resolve(0.0, true, &tokens), None);
        assert_eq!(resolve(-1.0, true, &tokens), None);
        assert_eq!(resolve(0.5, false, &tokens), None);
        assert_eq!(resolve(f64::NAN, true, &tokens), None);
    }

    #[test]
    fn test_zero_duration_tokens_never_match_later_time() {
        let tokens = parse_segments_into_words(&[TranscriptSegment::new("blip", 3.0, 3.0)]);
        assert_eq!(resolve(3.0, true, &tokens), Some(0));
        assert_eq!(resolve(3.001, true, &tokens), None);
    }

    #[test]
    fn test_index_is_monotone_for_increasing_time() {
        let tokens = parse_segments_into_words(&[
            TranscriptSegment::new("one two three", 0.0, 3.0),
            TranscriptSegment::new("four five", 3.0, 5.0),
            TranscriptSegment::new("six", 6.0, 7.0),
        ]);

        let mut last = 0usize;
        let mut t = 0.01;
        while t < 7.0 {
            if let Some(index) = resolve(t, true, &tokens) {
                assert!(index >= last, "index went backwards at t={}", t);
                last = index;
            }
            t += 0.037;
        }
    }

    #[test]
    fn test_segment_fallback_path() {
        let segments = vec![
            TranscriptSegment::new("", 0.0, 2.0),
            TranscriptSegment::new("", 2.0, 4.0),
        ];
        let tokens = parse_segments_into_words(&segments);
        let timeline = Timeline::select(&tokens, &segments);

        assert!(matches!(timeline, Timeline::Segments(_)));
        assert_eq!(timeline.resolve(3.0, true), Some(1));
    }
}
