use super::render::{render_timeline, RenderToken, ViewSnapshot};
use super::state::{Status, TranscriptState};
use crate::error::{EmptyState, FetchError, StreamError};
use crate::playback::{PlaybackSignal, ScrollArbiter, ScrollCommand, ScrollInput, Timeline};
use crate::source::{decode_message, StreamEvent, TranscriptInfo};
use crate::transcript::{parse_segments_into_words, TokenId, TranscriptSegment};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Why a fetch was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPurpose {
    /// First fetch after loading a content identifier (or a retry)
    Initial,
    /// Re-fetch after the stream reported `complete`
    Confirm,
    /// Re-fetch after the stream closed early or failed
    Fallback,
}

/// Side effects the driver must perform on behalf of the view model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Close the open stream and cancel any pending fetch
    Teardown,
    Fetch {
        generation: u64,
        content_id: u64,
        purpose: FetchPurpose,
    },
    /// Open the incremental channel (closing any existing one first)
    OpenStream { generation: u64, content_id: u64 },
    CloseStream,
}

/// Read-along state machine for one transcript pane
///
/// Owns the assembled transcript, the derived tokens, the current highlight
/// and the scroll arbiter. It performs no I/O: every method returns the
/// `Command`s a driver has to execute, and every asynchronous result is fed
/// back in tagged with the generation it was issued for. Results from an
/// older generation (a previous content identifier) are ignored.
#[derive(Debug)]
pub struct TranscriptViewModel {
    generation: u64,
    content_id: Option<u64>,
    known_duration: Option<f64>,
    media_duration: Option<f64>,
    state: TranscriptState,
    /// Text of the synthetic full-span segment, if that is what we show
    synthetic_text: Option<String>,
    stream_open: bool,
    playback: PlaybackSignal,
    highlighted: Option<usize>,
    arbiter: ScrollArbiter,
}

impl Default for TranscriptViewModel {
    fn default() -> Self {
        Self::new(ScrollArbiter::default())
    }
}

impl TranscriptViewModel {
    pub fn new(arbiter: ScrollArbiter) -> Self {
        Self {
            generation: 0,
            content_id: None,
            known_duration: None,
            media_duration: None,
            state: TranscriptState::default(),
            synthetic_text: None,
            stream_open: false,
            playback: PlaybackSignal::default(),
            highlighted: None,
            arbiter,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn content_id(&self) -> Option<u64> {
        self.content_id
    }

    pub fn state(&self) -> &TranscriptState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn status_label(&self) -> &'static str {
        self.state.status_label()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Show the transcript for `content_id`, discarding everything assembled before
    pub fn load(&mut self, content_id: u64, known_duration: Option<f64>) -> Vec<Command> {
        self.reset();
        self.content_id = Some(content_id);
        self.known_duration = known_duration.filter(|d| d.is_finite() && *d > 0.0);
        self.state = TranscriptState::loading();

        info!(
            "Loading transcript for testimony {} (generation {})",
            content_id, self.generation
        );

        vec![
            Command::Teardown,
            Command::Fetch {
                generation: self.generation,
                content_id,
                purpose: FetchPurpose::Initial,
            },
        ]
    }

    /// Back to `Idle`; nothing from the current generation is applied afterwards
    pub fn unload(&mut self) -> Vec<Command> {
        self.reset();
        vec![Command::Teardown]
    }

    /// Re-issue the initial fetch after an `Error`
    pub fn retry(&mut self) -> Vec<Command> {
        let Some(content_id) = self.content_id else {
            return Vec::new();
        };
        if self.state.status != Status::Error {
            return Vec::new();
        }

        info!("Retrying transcript fetch for testimony {}", content_id);
        self.state.status = Status::Loading;
        self.state.error_message = None;

        vec![Command::Fetch {
            generation: self.generation,
            content_id,
            purpose: FetchPurpose::Initial,
        }]
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.content_id = None;
        self.known_duration = None;
        self.media_duration = None;
        self.state = TranscriptState::default();
        self.synthetic_text = None;
        self.stream_open = false;
        self.highlighted = None;
        self.arbiter.reset();
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping result from generation {} (current {})",
                generation, self.generation
            );
            return false;
        }
        true
    }

    // ------------------------------------------------------------------
    // Fetch results
    // ------------------------------------------------------------------

    pub fn on_fetch_result(
        &mut self,
        generation: u64,
        purpose: FetchPurpose,
        result: Result<TranscriptInfo, FetchError>,
    ) -> Vec<Command> {
        if !self.is_current(generation) {
            return Vec::new();
        }
        let Some(content_id) = self.content_id else {
            return Vec::new();
        };

        match purpose {
            FetchPurpose::Initial => self.apply_initial_fetch(content_id, result),
            FetchPurpose::Confirm | FetchPurpose::Fallback => {
                self.apply_follow_up_fetch(content_id, purpose, result);
                Vec::new()
            }
        }
    }

    fn apply_initial_fetch(
        &mut self,
        content_id: u64,
        result: Result<TranscriptInfo, FetchError>,
    ) -> Vec<Command> {
        if self.state.status != Status::Loading {
            return Vec::new();
        }

        match result {
            Ok(info) if info.has_transcript => {
                info!("Transcript available for testimony {}", content_id);
                self.finish_available(info.transcript);
                Vec::new()
            }
            Ok(info) if info.can_stream() => {
                info!(
                    "Transcript for testimony {} is {:?}; opening stream",
                    content_id, info.transcript_status
                );
                self.state.status = Status::Streaming;
                self.stream_open = true;
                vec![Command::OpenStream {
                    generation: self.generation,
                    content_id,
                }]
            }
            Ok(info) => {
                info!(
                    "{} (status {:?}, can_have_transcript={}, has_media={})",
                    EmptyState { content_id },
                    info.transcript_status,
                    info.can_have_transcript,
                    info.has_media
                );
                self.state.status = Status::Unavailable;
                Vec::new()
            }
            Err(e) => {
                warn!("Transcript fetch for testimony {} failed: {}", content_id, e);
                // Partial content (if any) stays; only the status changes
                self.state.status = Status::Error;
                self.state.error_message = Some(user_message(&e).to_string());
                Vec::new()
            }
        }
    }

    fn apply_follow_up_fetch(
        &mut self,
        content_id: u64,
        purpose: FetchPurpose,
        result: Result<TranscriptInfo, FetchError>,
    ) {
        if self.state.status != Status::Streaming {
            return;
        }

        match result {
            Ok(info) if info.has_transcript => {
                info!(
                    "Transcript for testimony {} finished ({:?} fetch)",
                    content_id, purpose
                );
                self.finish_available(info.transcript);
            }
            Ok(_) => {
                info!(
                    "Transcript for testimony {} still not finished; keeping {} partial segments",
                    content_id,
                    self.state.segments.len()
                );
                self.state.streaming_ended = true;
            }
            Err(e) => {
                warn!(
                    "{:?} fetch for testimony {} failed: {}; keeping partial transcript",
                    purpose, content_id, e
                );
                self.state.streaming_ended = true;
            }
        }
    }

    /// Enter `Available`
    ///
    /// Streamed segments are kept only when they already cover the finished
    /// text; otherwise (stream dropped early, or segments published before we
    /// subscribed) the finished text replaces them as one synthetic span.
    fn finish_available(&mut self, transcript: Option<String>) {
        if let Some(text) = transcript.filter(|t| !t.trim().is_empty()) {
            let covered = !self.state.segments.is_empty()
                && same_words(&self.state.segments.concatenated_text(), &text);
            if !covered {
                if !self.state.segments.is_empty() {
                    info!(
                        "Replacing {} streamed segments with the finished transcript",
                        self.state.segments.len()
                    );
                }
                let segment = TranscriptSegment::synthetic(text.clone(), self.fallback_duration());
                self.synthetic_text = Some(text);
                self.state.segments.clear();
                self.state.segments.add(segment);
                self.rebuild_tokens();
            }
        }

        self.state.status = Status::Available;
        self.state.streaming_ended = false;
        self.stream_open = false;
    }

    fn fallback_duration(&self) -> f64 {
        self.known_duration.or(self.media_duration).unwrap_or(0.0)
    }

    // ------------------------------------------------------------------
    // Stream events
    // ------------------------------------------------------------------

    /// Feed one raw channel message; malformed messages are dropped and logged
    pub fn on_stream_payload(&mut self, generation: u64, payload: &[u8]) -> Vec<Command> {
        if !self.is_current(generation) {
            return Vec::new();
        }

        match decode_message(payload) {
            Ok(event) => self.on_stream_event(generation, event),
            Err(e) => {
                warn!("Dropping malformed transcript message: {}", e);
                Vec::new()
            }
        }
    }

    pub fn on_stream_event(&mut self, generation: u64, event: StreamEvent) -> Vec<Command> {
        if !self.is_current(generation) || !self.stream_open {
            return Vec::new();
        }
        let Some(content_id) = self.content_id else {
            return Vec::new();
        };

        match event {
            StreamEvent::Start => {
                debug!("Transcript stream started for testimony {}", content_id);
                Vec::new()
            }
            StreamEvent::Segment(segment) => {
                debug!(
                    "Segment {:.2}-{:.2}s: {}",
                    segment.start_seconds, segment.end_seconds, segment.text
                );
                if self.state.segments.add(segment) {
                    self.rebuild_tokens();
                }
                Vec::new()
            }
            StreamEvent::Complete => {
                info!("Transcript stream complete for testimony {}", content_id);
                self.stream_open = false;
                vec![
                    Command::CloseStream,
                    Command::Fetch {
                        generation: self.generation,
                        content_id,
                        purpose: FetchPurpose::Confirm,
                    },
                ]
            }
        }
    }

    /// The channel ended (or failed) before `complete`
    pub fn on_stream_closed(&mut self, generation: u64, error: Option<StreamError>) -> Vec<Command> {
        if !self.is_current(generation) || !self.stream_open {
            return Vec::new();
        }
        let Some(content_id) = self.content_id else {
            return Vec::new();
        };

        match &error {
            Some(e) => warn!("Transcript stream for testimony {} failed: {}", content_id, e),
            None => info!(
                "Transcript stream for testimony {} closed before completion",
                content_id
            ),
        }

        // Only one fallback per generation: the stream is never reopened
        self.stream_open = false;
        vec![Command::Fetch {
            generation: self.generation,
            content_id,
            purpose: FetchPurpose::Fallback,
        }]
    }

    fn rebuild_tokens(&mut self) {
        self.state.tokens = parse_segments_into_words(self.state.segments.segments());
        self.highlighted = self.timeline().resolve(
            self.playback.current_time_seconds(),
            self.playback.is_playing,
        );
    }

    fn timeline(&self) -> Timeline<'_> {
        Timeline::select(&self.state.tokens, self.state.segments.segments())
    }

    // ------------------------------------------------------------------
    // Playback and scrolling
    // ------------------------------------------------------------------

    /// Advance to a new playback clock reading
    ///
    /// Returns a scroll command when the highlight should be brought into view.
    pub fn tick(&mut self, signal: PlaybackSignal, now: Instant) -> Option<ScrollCommand> {
        self.playback = signal;
        self.highlighted = self
            .timeline()
            .resolve(signal.current_time_seconds(), signal.is_playing);

        let highlighted = self.highlighted_id();
        self.arbiter.next_scroll(signal.is_playing, highlighted, now)
    }

    pub fn on_scroll_input(&mut self, input: ScrollInput, now: Instant) {
        self.arbiter.on_input(input, now);
    }

    pub fn is_autoscroll_allowed(&self, now: Instant) -> bool {
        self.arbiter.is_autoscroll_allowed(now)
    }

    pub fn highlighted_id(&self) -> Option<TokenId> {
        let index = self.highlighted?;
        match self.timeline() {
            Timeline::Words(tokens) => tokens.get(index).map(|t| t.id),
            Timeline::Segments(segments) => segments.get(index).map(|s| TokenId {
                segment: s.id,
                index: 0,
            }),
        }
    }

    /// Validate a seek request; returns the time to hand to the player
    pub fn seek(&self, time_seconds: f64) -> Option<f64> {
        if !time_seconds.is_finite() {
            return None;
        }

        let mut target = time_seconds.max(0.0);
        if let Some(limit) = self.seek_limit() {
            target = target.min(limit);
        }
        Some(target)
    }

    /// Seek target for a clicked token
    pub fn seek_to_token(&self, id: TokenId) -> Option<f64> {
        let start = match self.timeline() {
            Timeline::Words(tokens) => tokens
                .iter()
                .find(|t| t.id == id && !t.is_whitespace)
                .map(|t| t.start_seconds),
            Timeline::Segments(segments) => segments
                .iter()
                .find(|s| s.id == id.segment)
                .map(|s| s.start_seconds),
        }?;
        self.seek(start)
    }

    fn seek_limit(&self) -> Option<f64> {
        self.known_duration.or(self.media_duration).or_else(|| {
            self.state
                .segments
                .segments()
                .iter()
                .map(|s| s.end_seconds)
                .reduce(f64::max)
        })
    }

    /// Duration reported by the player, used when no other timing exists
    pub fn set_media_duration(&mut self, duration_seconds: f64) {
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return;
        }
        self.media_duration = Some(duration_seconds);

        // A synthetic span built without any known duration can now be stretched
        if self.known_duration.is_none() {
            if let Some(text) = self.synthetic_text.clone() {
                self.state.segments.clear();
                self.state
                    .segments
                    .add(TranscriptSegment::synthetic(text, duration_seconds));
                self.rebuild_tokens();
            }
        }
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    pub fn render(&self) -> Vec<RenderToken> {
        render_timeline(self.timeline(), self.highlighted)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            content_id: self.content_id,
            status: self.state.status,
            status_label: self.status_label().to_string(),
            streaming_ended: self.state.streaming_ended,
            can_retry: self.state.status == Status::Error,
            text: self.state.segments.concatenated_text(),
            tokens: self.render(),
            highlighted: self.highlighted_id(),
            updated_at: Utc::now(),
        }
    }
}

/// Equal up to whitespace differences
fn same_words(a: &str, b: &str) -> bool {
    a.split_whitespace().eq(b.split_whitespace())
}

fn user_message(error: &FetchError) -> &'static str {
    match error {
        FetchError::NotFound(_) => "This testimony could not be found.",
        FetchError::Network(_) | FetchError::Decode(_) => {
            "The transcript could not be loaded. Please try again."
        }
    }
}
