// Integration tests for the transcript view model state machine
//
// These drive the model the way a session does: call an operation, inspect
// the returned commands, feed the results back in.

use readalong::error::{FetchError, StreamError};
use readalong::playback::{PlaybackSignal, ScrollInput};
use readalong::source::{TranscriptInfo, TranscriptStatus};
use readalong::view::{Command, FetchPurpose, Status, TranscriptViewModel};
use std::time::{Duration, Instant};

fn playing_at(ms: u64) -> PlaybackSignal {
    PlaybackSignal {
        current_time_ms: ms,
        is_playing: true,
    }
}

fn processing() -> TranscriptInfo {
    TranscriptInfo {
        has_transcript: false,
        transcript: None,
        transcript_status: TranscriptStatus::Processing,
        can_have_transcript: true,
        has_media: true,
    }
}

fn finished(text: &str) -> TranscriptInfo {
    TranscriptInfo {
        has_transcript: true,
        transcript: Some(text.to_string()),
        transcript_status: TranscriptStatus::Available,
        can_have_transcript: true,
        has_media: true,
    }
}

fn segment(text: &str, start: f64, end: f64) -> Vec<u8> {
    serde_json::json!({ "type": "segment", "text": text, "start": start, "end": end })
        .to_string()
        .into_bytes()
}

/// Load and answer the initial fetch with a processing status
fn streaming_model() -> (TranscriptViewModel, u64) {
    let mut vm = TranscriptViewModel::default();
    vm.load(7, Some(60.0));
    let gen = vm.generation();
    let commands = vm.on_fetch_result(gen, FetchPurpose::Initial, Ok(processing()));
    assert_eq!(
        commands,
        vec![Command::OpenStream {
            generation: gen,
            content_id: 7
        }]
    );
    assert_eq!(vm.status(), Status::Streaming);
    (vm, gen)
}

#[test]
fn test_load_issues_teardown_and_fetch() {
    let mut vm = TranscriptViewModel::default();
    assert_eq!(vm.status(), Status::Idle);

    let commands = vm.load(42, None);
    assert_eq!(vm.status(), Status::Loading);
    assert_eq!(
        commands,
        vec![
            Command::Teardown,
            Command::Fetch {
                generation: vm.generation(),
                content_id: 42,
                purpose: FetchPurpose::Initial
            }
        ]
    );
}

#[test]
fn test_streamed_segments_and_highlight() {
    let (mut vm, gen) = streaming_model();

    vm.on_stream_payload(gen, br#"{"type":"start"}"#);
    vm.on_stream_payload(gen, &segment("Hello world", 0.0, 2.0));
    vm.on_stream_payload(gen, &segment("Hello world", 0.0, 2.0));
    vm.on_stream_payload(gen, &segment("how are you", 2.0, 4.0));

    let state = vm.state();
    assert_eq!(state.segments.len(), 2);
    assert_eq!(state.segments.concatenated_text(), "Hello world how are you");

    let first: Vec<(&str, f64, f64)> = state.tokens[..3]
        .iter()
        .map(|t| (t.text.as_str(), t.start_seconds, t.end_seconds))
        .collect();
    assert_eq!(
        first,
        vec![("Hello", 0.0, 1.0), (" ", 1.0, 1.0), ("world", 1.0, 2.0)]
    );

    let now = Instant::now();
    vm.tick(playing_at(500), now);
    let highlighted = vm.render().into_iter().find(|t| t.is_highlighted);
    assert_eq!(highlighted.map(|t| t.text), Some("Hello".to_string()));

    vm.tick(playing_at(1500), now);
    let highlighted = vm.render().into_iter().find(|t| t.is_highlighted);
    assert_eq!(highlighted.map(|t| t.text), Some("world".to_string()));
}

#[test]
fn test_finished_transcript_is_available_immediately() {
    let mut vm = TranscriptViewModel::default();
    vm.load(3, Some(120.0));
    let gen = vm.generation();

    let commands = vm.on_fetch_result(gen, FetchPurpose::Initial, Ok(finished("Testimony text.")));

    assert!(commands.is_empty(), "no stream should be opened");
    assert_eq!(vm.status(), Status::Available);

    let segments = vm.state().segments.segments();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start_seconds, 0.0);
    assert_eq!(segments[0].end_seconds, 120.0);
    assert_eq!(segments[0].text, "Testimony text.");
}

#[test]
fn test_early_close_keeps_partial_text() {
    let (mut vm, gen) = streaming_model();

    vm.on_stream_payload(gen, &segment("one", 0.0, 1.0));
    vm.on_stream_payload(gen, &segment("two", 1.0, 2.0));
    vm.on_stream_payload(gen, &segment("three", 2.0, 3.0));

    let commands = vm.on_stream_closed(gen, None);
    assert_eq!(
        commands,
        vec![Command::Fetch {
            generation: gen,
            content_id: 7,
            purpose: FetchPurpose::Fallback
        }]
    );

    let commands = vm.on_fetch_result(gen, FetchPurpose::Fallback, Ok(processing()));
    assert!(commands.is_empty());
    assert_eq!(vm.status(), Status::Streaming);
    assert!(vm.state().streaming_ended);
    assert_eq!(vm.state().segments.concatenated_text(), "one two three");

    // A second close does not trigger another fallback
    assert!(vm.on_stream_closed(gen, None).is_empty());
}

#[test]
fn test_fallback_with_finished_transcript_replaces_partial_stream() {
    let (mut vm, gen) = streaming_model();
    vm.on_stream_payload(gen, &segment("one", 0.0, 1.0));
    vm.on_stream_closed(gen, None);

    let commands = vm.on_fetch_result(
        gen,
        FetchPurpose::Fallback,
        Ok(finished("one two three four five")),
    );

    assert!(commands.is_empty());
    assert_eq!(vm.status(), Status::Available);
    assert!(!vm.state().streaming_ended);
    assert_eq!(vm.state().segments.concatenated_text(), "one two three four five");

    let segments = vm.state().segments.segments();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].start_seconds, 0.0);
    assert_eq!(segments[0].end_seconds, 60.0);
}

#[test]
fn test_confirm_with_missed_segments_uses_finished_text() {
    let (mut vm, gen) = streaming_model();
    // Segments published before the subscription never arrive
    vm.on_stream_payload(gen, &segment("three four", 20.0, 30.0));
    vm.on_stream_payload(gen, br#"{"type":"complete"}"#);

    vm.on_fetch_result(gen, FetchPurpose::Confirm, Ok(finished("one two three four")));

    assert_eq!(vm.status(), Status::Available);
    assert_eq!(vm.state().segments.concatenated_text(), "one two three four");
    assert_eq!(vm.state().segments.segments()[0].start_seconds, 0.0);
}

#[test]
fn test_confirm_keeps_streamed_timing_despite_whitespace_differences() {
    let (mut vm, gen) = streaming_model();
    vm.on_stream_payload(gen, &segment("Hello world", 0.0, 2.0));
    vm.on_stream_payload(gen, &segment("how are you", 2.0, 4.0));
    vm.on_stream_payload(gen, br#"{"type":"complete"}"#);

    vm.on_fetch_result(
        gen,
        FetchPurpose::Confirm,
        Ok(finished("Hello world\nhow  are you")),
    );

    assert_eq!(vm.status(), Status::Available);
    let segments = vm.state().segments.segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[1].start_seconds, 2.0);
}

#[test]
fn test_fallback_fetch_error_never_rolls_back() {
    let (mut vm, gen) = streaming_model();
    vm.on_stream_payload(gen, &segment("partial words", 0.0, 2.0));

    vm.on_stream_closed(gen, Some(StreamError::Open("connection refused".into())));
    vm.on_fetch_result(
        gen,
        FetchPurpose::Fallback,
        Err(FetchError::Network("timeout".into())),
    );

    assert_eq!(vm.status(), Status::Streaming);
    assert!(vm.state().streaming_ended);
    assert_eq!(vm.state().tokens.len(), 3);
}

#[test]
fn test_complete_then_confirm_becomes_available() {
    let (mut vm, gen) = streaming_model();
    vm.on_stream_payload(gen, &segment("all done", 0.0, 2.0));

    let commands = vm.on_stream_payload(gen, br#"{"type":"complete"}"#);
    assert_eq!(
        commands,
        vec![
            Command::CloseStream,
            Command::Fetch {
                generation: gen,
                content_id: 7,
                purpose: FetchPurpose::Confirm
            }
        ]
    );

    vm.on_fetch_result(gen, FetchPurpose::Confirm, Ok(finished("all done")));
    assert_eq!(vm.status(), Status::Available);
    // Streamed timing is kept over a synthetic span
    assert_eq!(vm.state().segments.segments()[0].end_seconds, 2.0);

    // Late closure after completion is ignored
    assert!(vm.on_stream_closed(gen, None).is_empty());
}

#[test]
fn test_malformed_segment_is_dropped_without_rollback() {
    let (mut vm, gen) = streaming_model();
    vm.on_stream_payload(gen, &segment("kept", 0.0, 1.0));
    vm.on_stream_payload(gen, br#"{"type":"segment","text":"bad","start":"x","end":2}"#);
    vm.on_stream_payload(gen, br#"{"type":"segment","start":1,"end":2}"#);
    vm.on_stream_payload(gen, &segment("also kept", 1.0, 2.0));

    assert_eq!(vm.state().segments.concatenated_text(), "kept also kept");
    assert_eq!(vm.status(), Status::Streaming);
}

#[test]
fn test_unavailable_when_generation_impossible() {
    let mut vm = TranscriptViewModel::default();
    vm.load(9, None);
    let info = TranscriptInfo {
        transcript_status: TranscriptStatus::Processing,
        has_media: false,
        ..processing()
    };
    assert!(vm
        .on_fetch_result(vm.generation(), FetchPurpose::Initial, Ok(info))
        .is_empty());
    assert_eq!(vm.status(), Status::Unavailable);
}

#[test]
fn test_initial_fetch_error_then_retry() {
    let mut vm = TranscriptViewModel::default();
    vm.load(5, None);
    let gen = vm.generation();
    vm.on_fetch_result(
        gen,
        FetchPurpose::Initial,
        Err(FetchError::Network("connection refused".into())),
    );

    assert_eq!(vm.status(), Status::Error);
    let snapshot = vm.snapshot();
    assert!(snapshot.can_retry);
    assert!(!snapshot.status_label.contains("connection refused"));

    let commands = vm.retry();
    assert_eq!(vm.status(), Status::Loading);
    assert_eq!(
        commands,
        vec![Command::Fetch {
            generation: gen,
            content_id: 5,
            purpose: FetchPurpose::Initial
        }]
    );
}

#[test]
fn test_results_from_previous_content_are_ignored() {
    let (mut vm, old_gen) = streaming_model();
    vm.on_stream_payload(old_gen, &segment("old testimony", 0.0, 2.0));

    vm.load(8, None);
    let new_gen = vm.generation();
    assert_ne!(old_gen, new_gen);
    assert!(vm.state().segments.is_empty());

    // Late events for the torn-down content
    vm.on_stream_payload(old_gen, &segment("late", 2.0, 3.0));
    assert!(vm.on_stream_closed(old_gen, None).is_empty());
    assert!(vm
        .on_fetch_result(old_gen, FetchPurpose::Initial, Ok(finished("stale")))
        .is_empty());

    assert_eq!(vm.status(), Status::Loading);
    assert!(vm.state().segments.is_empty());
}

#[test]
fn test_manual_scroll_suppresses_autoscroll() {
    let (mut vm, gen) = streaming_model();
    let words: Vec<String> = (0..30).map(|i| format!("w{}", i)).collect();
    vm.on_stream_payload(gen, &segment(&words.join(" "), 0.0, 30.0));

    let t0 = Instant::now();
    assert!(vm.tick(playing_at(10_000), t0).is_some());

    vm.on_scroll_input(ScrollInput::Wheel, t0);

    // Highlight keeps moving, but nothing scrolls for 1500 ms
    let before = vm.highlighted_id();
    for step in 1..=14u64 {
        let now = t0 + Duration::from_millis(step * 100);
        let command = vm.tick(playing_at(10_000 + step * 100), now);
        assert!(command.is_none(), "scrolled during suppression at +{}ms", step * 100);
    }
    assert!(vm.highlighted_id().is_some());
    assert_ne!(vm.highlighted_id(), before);

    let after = t0 + Duration::from_millis(1600);
    let command = vm.tick(playing_at(11_600), after);
    assert_eq!(command.map(|c| c.token), vm.highlighted_id());
}

#[test]
fn test_seek_clamps_to_duration() {
    let mut vm = TranscriptViewModel::default();
    vm.load(3, Some(90.0));
    vm.on_fetch_result(vm.generation(), FetchPurpose::Initial, Ok(finished("a b c")));

    assert_eq!(vm.seek(-3.0), Some(0.0));
    assert_eq!(vm.seek(45.5), Some(45.5));
    assert_eq!(vm.seek(500.0), Some(90.0));
    assert_eq!(vm.seek(f64::NAN), None);

    let second_word = vm.state().tokens[2].id;
    assert_eq!(vm.seek_to_token(second_word), Some(30.0));
}

#[test]
fn test_media_duration_stretches_synthetic_span() {
    let mut vm = TranscriptViewModel::default();
    vm.load(3, None);
    vm.on_fetch_result(vm.generation(), FetchPurpose::Initial, Ok(finished("one two")));
    assert_eq!(vm.state().segments.segments()[0].end_seconds, 0.0);

    vm.set_media_duration(40.0);

    let segments = vm.state().segments.segments();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].end_seconds, 40.0);
    assert_eq!(vm.state().tokens[2].start_seconds, 20.0);
}

#[test]
fn test_unload_returns_to_idle() {
    let (mut vm, gen) = streaming_model();
    vm.on_stream_payload(gen, &segment("text", 0.0, 1.0));

    assert_eq!(vm.unload(), vec![Command::Teardown]);
    assert_eq!(vm.status(), Status::Idle);
    assert!(vm.render().is_empty());
    assert_eq!(vm.status_label(), "");
}
