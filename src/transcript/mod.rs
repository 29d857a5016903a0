//! Transcript data and word alignment
//!
//! This module provides:
//! - `TranscriptSegment` / `WordToken` data types
//! - `SegmentAssembler` for merging streamed segments in time order
//! - Word tokenization with synthetic per-word timing

mod assembler;
mod segment;
mod tokenizer;

pub use assembler::SegmentAssembler;
pub use segment::{SegmentKey, Timed, TokenId, TranscriptSegment, WordToken};
pub use tokenizer::parse_segments_into_words;
