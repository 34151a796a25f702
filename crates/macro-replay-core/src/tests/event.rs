use crate::{Event, Macro, MouseButton, tests::support::*};

use chrono::NaiveDate;
use serde_json::{Value, json};

/// WHAT: Click events serialize with the interchange field names
/// WHY: Macro files are shared with other tools that expect this exact schema
#[test]
#[allow(clippy::unwrap_used)]
fn given_click_event_when_serializing_then_uses_type_tag_and_timestamp_key() {
    // Given: A left-button press at (100, 200)
    let event = click(0.25, 100, 200, true);

    // When: Serializing to JSON
    let value = serde_json::to_value(&event).unwrap();

    // Then: Tagged with type, t stored as timestamp, button lowercase
    assert_eq!(
        value,
        json!({
            "type": "mouse_click",
            "timestamp": 0.25,
            "x": 100,
            "y": 200,
            "button": "left",
            "pressed": true
        })
    );
}

/// WHAT: Buttons written as "Button.left" are still readable
/// WHY: Files from older recorders spell buttons that way
#[test]
#[allow(clippy::unwrap_used)]
fn given_legacy_button_name_when_deserializing_then_maps_to_button() {
    // Given: A click written by an older recorder
    let raw = r#"{"type":"mouse_click","timestamp":1.0,"x":5,"y":6,"button":"Button.right","pressed":false}"#;

    // When: Parsing it
    let event: Event = serde_json::from_str(raw).unwrap();

    // Then: Button resolves and re-serializes in the current spelling
    assert!(matches!(
        event,
        Event::MouseClick {
            button: MouseButton::Right,
            pressed: false,
            ..
        }
    ));
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["button"], Value::from("right"));
}

/// WHAT: Every event kind survives a file round trip
/// WHY: Saving and reloading must not lose or alter any input
#[test]
#[allow(clippy::unwrap_used)]
fn given_macro_with_every_event_kind_when_round_tripping_then_identical() {
    // Given: A macro containing each event variant
    let created = NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_micro_opt(14, 7, 9, 123_456)
        .unwrap();
    let original = Macro::new(
        "all_kinds",
        "one of each",
        created,
        vec![
            mouse_move(0.0, 1, 2),
            click(0.1, 3, 4, true),
            click(0.2, 3, 4, false),
            Event::MouseScroll {
                t: 0.3,
                x: 5,
                y: 6,
                dx: -1,
                dy: 2,
            },
            key_press(0.4, "Key.shift"),
            key_release(0.5, "Key.shift"),
        ],
    );

    // When: Serializing and parsing back
    let json = serde_json::to_string_pretty(&original).unwrap();
    let parsed: Macro = serde_json::from_str(&json).unwrap();

    // Then: Nothing changed
    assert_eq!(parsed, original);
    assert!(json.contains("\"created\": \"2024-03-05T14:07:09.123456\""));
}

/// WHAT: Unknown event types are rejected
/// WHY: Silently skipping input would replay a different macro than recorded
#[test]
fn given_unknown_event_type_when_deserializing_then_error() {
    // Given: An event with an unsupported type
    let raw = r#"{"type":"touch","timestamp":0.0}"#;

    // When: Parsing it
    let result = serde_json::from_str::<Event>(raw);

    // Then: Parsing fails
    assert!(result.is_err());
}

/// WHAT: kind() matches the serialized type tag
/// WHY: Logs and listings report the same names as the file
#[test]
#[allow(clippy::unwrap_used)]
fn given_events_when_reading_kind_then_matches_serialized_tag() {
    // Given: One event per kind
    let events = vec![
        mouse_move(0.0, 0, 0),
        click(0.0, 0, 0, true),
        key_press(0.0, "a"),
        key_release(0.0, "a"),
    ];

    for event in events {
        // When: Serializing
        let value = serde_json::to_value(&event).unwrap();

        // Then: The tag equals kind()
        assert_eq!(value["type"], Value::from(event.kind()));
    }
}
