use super::segment::TranscriptSegment;
use tracing::debug;

/// Ordered, de-duplicated collection of transcript segments
///
/// Segments may arrive duplicated or out of order; the collection always stays
/// sorted by start time (ties broken by end time) and holds each key once.
#[derive(Debug, Default, Clone)]
pub struct SegmentAssembler {
    segments: Vec<TranscriptSegment>,
}

impl SegmentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a segment in order. Returns `false` if its key was already present.
    pub fn add(&mut self, segment: TranscriptSegment) -> bool {
        match self.segments.binary_search_by(|s| s.id.cmp(&segment.id)) {
            Ok(_) => {
                debug!("Ignoring re-delivered segment {}", segment.id);
                false
            }
            Err(pos) => {
                self.segments.insert(pos, segment);
                true
            }
        }
    }

    /// Segment texts in start order, joined by a single space
    pub fn concatenated_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_ignored() {
        let mut assembler = SegmentAssembler::new();
        assert!(assembler.add(TranscriptSegment::new("Hello world", 0.0, 2.0)));
        assert!(!assembler.add(TranscriptSegment::new("Hello world", 0.0, 2.0)));
        assert!(assembler.add(TranscriptSegment::new("how are you", 2.0, 4.0)));

        assert_eq!(assembler.len(), 2);
        assert_eq!(assembler.concatenated_text(), "Hello world how are you");
    }

    #[test]
    fn test_out_of_order_delivery_is_sorted() {
        let mut assembler = SegmentAssembler::new();
        assembler.add(TranscriptSegment::new("third", 4.0, 6.0));
        assembler.add(TranscriptSegment::new("first", 0.0, 2.0));
        assembler.add(TranscriptSegment::new("second", 2.0, 4.0));
        assembler.add(TranscriptSegment::new("first", 0.0, 2.0));

        let starts: Vec<f64> = assembler.segments().iter().map(|s| s.start_seconds).collect();
        assert_eq!(starts, vec![0.0, 2.0, 4.0]);
        assert_eq!(assembler.concatenated_text(), "first second third");
    }

    #[test]
    fn test_same_start_different_end_are_distinct() {
        let mut assembler = SegmentAssembler::new();
        assembler.add(TranscriptSegment::new("longer", 1.0, 3.0));
        assembler.add(TranscriptSegment::new("shorter", 1.0, 2.0));

        let texts: Vec<&str> = assembler.segments().iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["shorter", "longer"]);
    }

    #[test]
    fn test_sorted_and_unique_for_many_deliveries() {
        let mut assembler = SegmentAssembler::new();
        // Deterministic shuffle with repeats
        let order = [7usize, 3, 9, 3, 0, 5, 1, 7, 8, 2, 6, 4, 0, 9];
        for &i in &order {
            let start = i as f64 * 1.5;
            assembler.add(TranscriptSegment::new(format!("s{}", i), start, start + 1.5));
        }

        assert_eq!(assembler.len(), 10);
        let segments = assembler.segments();
        for pair in segments.windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds);
            assert_ne!(pair[0].id, pair[1].id);
        }
    }

    #[test]
    fn test_clear_empties_collection() {
        let mut assembler = SegmentAssembler::new();
        assembler.add(TranscriptSegment::new("a", 0.0, 1.0));
        assembler.clear();
        assert!(assembler.is_empty());
        assert_eq!(assembler.concatenated_text(), "");
    }
}
