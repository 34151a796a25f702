use crate::{Event, Macro, tests::support::*};

use chrono::{NaiveDate, NaiveDateTime, Timelike};

#[allow(clippy::unwrap_used)]
fn created_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_nano_opt(14, 7, 9, 123_456_789)
        .unwrap()
}

/// WHAT: Sealed macros are named after their creation time
/// WHY: Auto-saved files must get unique, sortable names
#[test]
fn given_events_when_sealing_then_named_after_created_time() {
    // Given: A few recorded events
    let events = vec![click(0.0, 1, 1, true)];

    // When: Sealing at a known time
    let sealed = Macro::seal(events, created_at());

    // Then: Name follows macro_<YYYYMMDD_HHMMSS>
    assert_eq!(sealed.name(), "macro_20240305_140709");
}

/// WHAT: Sealed description counts presses and reports duration
/// WHY: Listings show what a macro does without opening it
#[test]
fn given_presses_and_releases_when_sealing_then_description_counts_presses_only() {
    // Given: One full click and one full keystroke over 1.5 seconds
    let events = vec![
        click(0.0, 10, 10, true),
        click(0.25, 10, 10, false),
        key_press(1.0, "a"),
        key_release(1.5, "a"),
    ];

    // When: Sealing
    let sealed = Macro::seal(events, created_at());

    // Then: Releases are not counted; duration is the last timestamp
    assert_eq!(
        sealed.description(),
        "Auto-saved macro: 1 clicks, 1 key presses, 1.5s duration"
    );
    let stats = sealed.stats();
    assert_eq!(stats.clicks, 1);
    assert_eq!(stats.key_presses, 1);
    assert_eq!(stats.moves, 0);
}

/// WHAT: Creation time keeps microsecond precision only
/// WHY: Interchange files carry at most six fractional digits
#[test]
fn given_nanosecond_time_when_building_macro_then_truncated_to_micros() {
    // Given/When: A macro created with nanosecond precision
    let built = Macro::new("m", "", created_at(), Vec::new());

    // Then: Sub-microsecond digits are dropped
    assert_eq!(built.created().nanosecond(), 123_456_000);
}

/// WHAT: Renaming yields a new macro and leaves the source untouched
/// WHY: Saved macros are read-only once sealed
#[test]
fn given_sealed_macro_when_renaming_then_original_unchanged() {
    // Given: A sealed macro
    let sealed = Macro::seal(vec![key_press(0.0, "x")], created_at());

    // When: Renaming
    let renamed = sealed.renamed("login", "types the password");

    // Then: Copy has the new identity, original keeps its own
    assert_eq!(renamed.name(), "login");
    assert_eq!(renamed.description(), "types the password");
    assert_eq!(renamed.events(), sealed.events());
    assert_eq!(renamed.created(), sealed.created());
    assert_eq!(sealed.name(), "macro_20240305_140709");
}

/// WHAT: Timestamp ordering check accepts ties and rejects regressions
/// WHY: Playback relies on non-decreasing offsets starting at zero
#[test]
fn given_various_sequences_when_checking_order_then_detects_violations() {
    // Given: Ordered, tied, shifted and regressing sequences
    let ordered = Macro::new("a", "", created_at(), vec![mouse_move(0.0, 0, 0), mouse_move(0.5, 0, 0)]);
    let tied = Macro::new("b", "", created_at(), vec![key_press(0.0, "a"), key_release(0.0, "a")]);
    let shifted = Macro::new("c", "", created_at(), vec![key_press(0.1, "a")]);
    let regressing = Macro::new(
        "d",
        "",
        created_at(),
        vec![key_press(0.0, "a"), key_press(0.4, "b"), key_press(0.3, "c")],
    );
    let empty = Macro::new("e", "", created_at(), Vec::<Event>::new());

    // When/Then: Only the first two and the empty macro pass
    assert!(ordered.has_ordered_timestamps());
    assert!(tied.has_ordered_timestamps());
    assert!(!shifted.has_ordered_timestamps());
    assert!(!regressing.has_ordered_timestamps());
    assert!(empty.has_ordered_timestamps());
    assert_eq!(empty.duration(), 0.0);
}
