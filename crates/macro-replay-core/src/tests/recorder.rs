use crate::{
    EngineError, Event, MouseButton, PlaybackMode, RawInput, Recorder, RecorderConfig,
    SessionState, tests::support::*,
};

use std::{sync::Arc, time::Duration};

fn recorder_with(capture: Arc<ChannelCapture>) -> (Recorder, Arc<SessionState>) {
    let session = Arc::new(SessionState::new());
    let recorder = Recorder::new(Arc::clone(&session), capture, RecorderConfig::default());
    (recorder, session)
}

fn left_press() -> RawInput {
    RawInput::MouseButton {
        x: 100,
        y: 200,
        button: MouseButton::Left,
        pressed: true,
    }
}

fn key(name: &str, pressed: bool) -> RawInput {
    RawInput::Key {
        key: name.to_string(),
        pressed,
    }
}

/// WHAT: Timestamps are relative to the first captured event
/// WHY: Playback schedules every event as an offset from pass start
#[test]
#[allow(clippy::unwrap_used)]
fn given_inputs_when_stopping_then_timestamps_start_at_zero() {
    // Given: A recording with inputs stamped 1.0 s and 1.5 s into the process
    let capture = Arc::new(ChannelCapture::default());
    let (recorder, _session) = recorder_with(Arc::clone(&capture));
    recorder.start().unwrap();
    assert!(capture.emit(1_000, left_press()));
    assert!(capture.emit(1_500, key("a", true)));

    // When: Stopping
    let recorded = recorder.stop().unwrap();

    // Then: First event at 0.0, second at 0.5
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded.events()[0].t(), 0.0);
    assert_eq!(recorded.events()[1].t(), 0.5);
    assert!(matches!(
        &recorded.events()[0],
        Event::MouseClick { x: 100, y: 200, .. }
    ));
    assert!(recorded.name().starts_with("macro_"));
    assert!(recorded.has_ordered_timestamps());
}

/// WHAT: Mouse moves are throttled while other inputs pass
/// WHY: Keeps macros small without losing clicks or keys
#[test]
#[allow(clippy::unwrap_used)]
fn given_rapid_moves_when_recording_then_throttled_but_keys_kept() {
    // Given: A recording session
    let capture = Arc::new(ChannelCapture::default());
    let (recorder, _session) = recorder_with(Arc::clone(&capture));
    recorder.start().unwrap();

    // When: Moves every 10 ms with a key in between
    for at in [0, 10, 20, 30] {
        capture.emit(at, RawInput::MouseMove { x: at as i32, y: 0 });
    }
    capture.emit(35, key("b", true));
    capture.emit(60, RawInput::MouseMove { x: 60, y: 0 });
    let recorded = recorder.stop().unwrap();

    // Then: Moves at 0 and 60 ms survive, key kept
    let stats = recorded.stats();
    assert_eq!(stats.moves, 2);
    assert_eq!(stats.key_presses, 1);
    assert_eq!(recorded.len(), 3);
}

/// WHAT: Late-stamped inputs never move time backwards
/// WHY: Sealed macros must have non-decreasing timestamps
#[test]
#[allow(clippy::unwrap_used)]
fn given_out_of_order_stamps_when_recording_then_timestamps_non_decreasing() {
    // Given: A recording session
    let capture = Arc::new(ChannelCapture::default());
    let (recorder, _session) = recorder_with(Arc::clone(&capture));
    recorder.start().unwrap();

    // When: An input arrives stamped earlier than its predecessor
    capture.emit(100, key("a", true));
    capture.emit(400, key("a", false));
    capture.emit(300, key("b", true));
    let recorded = recorder.stop().unwrap();

    // Then: The late one is clamped to the previous timestamp
    let times: Vec<f64> = recorded.events().iter().map(Event::t).collect();
    assert_eq!(times.len(), 3);
    assert_eq!(times[0], 0.0);
    assert_eq!(times[2], times[1]);
    assert!(recorded.has_ordered_timestamps());
}

/// WHAT: Refused capture leaves the session idle
/// WHY: A failed start must not block future attempts
#[test]
fn given_refusing_capture_when_starting_then_capture_unavailable_and_idle() {
    // Given: A capture source without permission
    let capture = Arc::new(ChannelCapture::refusing("accessibility permission denied"));
    let (recorder, session) = recorder_with(capture);

    // When: Starting
    let result = recorder.start();

    // Then: CaptureUnavailable and not recording
    assert!(matches!(result, Err(EngineError::CaptureUnavailable { .. })));
    assert!(!session.snapshot().recording);
}

/// WHAT: Stop without a recording is refused
/// WHY: There is no macro to seal
#[test]
fn given_idle_recorder_when_stopping_then_not_recording() {
    // Given: An idle recorder
    let (recorder, _session) = recorder_with(Arc::new(ChannelCapture::default()));

    // When: Stopping
    let result = recorder.stop();

    // Then: NotRecording
    assert!(matches!(result, Err(EngineError::NotRecording { .. })));
}

/// WHAT: Start while playing is refused
/// WHY: Synthetic input must not be recorded
#[test]
#[allow(clippy::unwrap_used)]
fn given_playing_session_when_starting_then_busy_and_not_subscribed() {
    // Given: A session in playback
    let capture = Arc::new(ChannelCapture::default());
    let (recorder, session) = recorder_with(Arc::clone(&capture));
    session.begin_playback(PlaybackMode::Looping).unwrap();

    // When: Starting a recording
    let result = recorder.start();

    // Then: Busy and the capture source untouched
    assert!(matches!(result, Err(EngineError::Busy { .. })));
    assert!(!capture.is_subscribed());
}

/// WHAT: Live event count grows during recording
/// WHY: The UI shows progress without waiting for stop
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_when_inputs_arrive_then_event_count_grows() {
    // Given: A recording session
    let capture = Arc::new(ChannelCapture::default());
    let (recorder, _session) = recorder_with(Arc::clone(&capture));
    recorder.start().unwrap();

    // When: Three keys arrive
    capture.emit(0, key("a", true));
    capture.emit(5, key("a", false));
    capture.emit(9, key("b", true));

    // Then: The count reaches three before stopping
    assert!(wait_for(Duration::from_secs(2), || recorder.event_count() == 3));
    recorder.stop().unwrap();
}

/// WHAT: Stopping detaches the capture source
/// WHY: Input after stop must not leak into the sealed macro
#[test]
#[allow(clippy::unwrap_used)]
fn given_stopped_recording_when_input_arrives_then_not_delivered() {
    // Given: A finished recording
    let capture = Arc::new(ChannelCapture::default());
    let (recorder, session) = recorder_with(Arc::clone(&capture));
    recorder.start().unwrap();
    capture.emit(0, key("a", true));
    let recorded = recorder.stop().unwrap();

    // When: More input arrives
    let delivered = capture.emit(10, key("b", true));

    // Then: Nobody is listening and the macro is unchanged
    assert!(!delivered);
    assert_eq!(recorded.len(), 1);
    assert!(!session.snapshot().recording);
}

/// WHAT: Each recording starts with fresh throttle state
/// WHY: A move right after the previous recording must not be dropped
#[test]
#[allow(clippy::unwrap_used)]
fn given_second_recording_when_first_move_is_close_to_last_then_kept() {
    // Given: A first recording ending with a move at 100 ms
    let capture = Arc::new(ChannelCapture::default());
    let (recorder, _session) = recorder_with(Arc::clone(&capture));
    recorder.start().unwrap();
    capture.emit(100, RawInput::MouseMove { x: 0, y: 0 });
    recorder.stop().unwrap();

    // When: A second recording gets a move at 110 ms
    recorder.start().unwrap();
    capture.emit(110, RawInput::MouseMove { x: 1, y: 1 });
    let second = recorder.stop().unwrap();

    // Then: The move is kept at t = 0
    assert_eq!(second.len(), 1);
    assert_eq!(second.events()[0].t(), 0.0);
}

/// WHAT: An empty recording still seals into a macro
/// WHY: Stop always returns a new macro even if nothing happened
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_input_when_stopping_then_empty_macro_returned() {
    // Given: A recording with no input
    let (recorder, _session) = recorder_with(Arc::new(ChannelCapture::default()));
    recorder.start().unwrap();

    // When: Stopping
    let recorded = recorder.stop().unwrap();

    // Then: Empty with a zero-length summary
    assert!(recorded.is_empty());
    assert_eq!(
        recorded.description(),
        "Auto-saved macro: 0 clicks, 0 key presses, 0.0s duration"
    );
}
