use crate::{EngineError, Macro, MacroStore, MouseButton, tests::support::*};

use std::fs;

use chrono::NaiveDate;

#[allow(clippy::unwrap_used)]
fn sample(name: &str, day: u32) -> Macro {
    let created = NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    Macro::new(
        name,
        "sample",
        created,
        vec![click(0.0, 10, 20, true), click(0.1, 10, 20, false), key_press(0.5, "a")],
    )
}

/// WHAT: Saved macros load back unchanged
/// WHY: Persisted macros are replayed in later sessions
#[test]
#[allow(clippy::unwrap_used)]
fn given_saved_macro_when_loading_then_identical() {
    // Given: A store with one saved macro
    let dir = temp_dir();
    let store = MacroStore::new(&dir).unwrap();
    let original = sample("greeting", 1);
    let path = store.save(&original).unwrap();

    // When: Loading it by name
    let loaded = store.load("greeting").unwrap();

    // Then: Same macro, stored as pretty JSON with no temp file left behind
    assert_eq!(loaded, original);
    assert_eq!(path, dir.join("greeting.json"));
    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("\n  \"name\": \"greeting\""));
    assert!(!dir.join("greeting.json.tmp").exists());
    let _ = fs::remove_dir_all(&dir);
}

/// WHAT: Loading an unknown name fails with MacroNotFound
/// WHY: Callers distinguish a missing macro from a corrupt one
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_name_when_loading_then_macro_not_found() {
    // Given: An empty store
    let dir = temp_dir();
    let store = MacroStore::new(&dir).unwrap();

    // When: Loading a name that was never saved
    let result = store.load("nope");

    // Then: MacroNotFound
    assert!(matches!(result, Err(EngineError::MacroNotFound { .. })));
    let _ = fs::remove_dir_all(&dir);
}

/// WHAT: Listing skips unreadable files and sorts newest first
/// WHY: One corrupt file must not hide every other macro
#[test]
#[allow(clippy::unwrap_used)]
fn given_mixed_directory_when_listing_then_only_valid_macros_newest_first() {
    // Given: Two macros, a corrupt JSON file and a non-JSON file
    let dir = temp_dir();
    let store = MacroStore::new(&dir).unwrap();
    store.save(&sample("older", 1)).unwrap();
    store.save(&sample("newer", 2)).unwrap();
    fs::write(dir.join("broken.json"), "{ not json").unwrap();
    fs::write(dir.join("notes.txt"), "ignore me").unwrap();

    // When: Listing
    let summaries = store.list().unwrap();

    // Then: The two macros, newest first, with event counts
    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["newer", "older"]);
    assert_eq!(summaries[0].events_count, 3);
    assert_eq!(summaries[0].description, "sample");
    let _ = fs::remove_dir_all(&dir);
}

/// WHAT: Deleting removes the file; deleting again is MacroNotFound
/// WHY: Delete reports whether there was anything to remove
#[test]
#[allow(clippy::unwrap_used)]
fn given_saved_macro_when_deleting_twice_then_second_is_not_found() {
    // Given: A saved macro
    let dir = temp_dir();
    let store = MacroStore::new(&dir).unwrap();
    store.save(&sample("temp", 1)).unwrap();

    // When: Deleting twice
    let first = store.delete("temp");
    let second = store.delete("temp");

    // Then: First succeeds, second reports MacroNotFound, load fails too
    assert!(first.is_ok());
    assert!(matches!(second, Err(EngineError::MacroNotFound { .. })));
    assert!(matches!(store.load("temp"), Err(EngineError::MacroNotFound { .. })));
    let _ = fs::remove_dir_all(&dir);
}

/// WHAT: Names with path separators stay inside the store directory
/// WHY: A macro name must never write outside the macros folder
#[test]
#[allow(clippy::unwrap_used)]
fn given_name_with_separators_when_saving_then_file_inside_dir() {
    // Given: A name that looks like a path
    let dir = temp_dir();
    let store = MacroStore::new(&dir).unwrap();
    let tricky = sample("../escape/attempt", 1);

    // When: Saving and reloading it
    let path = store.save(&tricky).unwrap();
    let loaded = store.load("../escape/attempt").unwrap();

    // Then: File lives directly in the store dir and the name is preserved inside
    assert_eq!(path.parent(), Some(dir.as_path()));
    assert_eq!(loaded.name(), "../escape/attempt");
    let _ = fs::remove_dir_all(&dir);
}

/// WHAT: Files from older recorders load
/// WHY: Existing macro libraries must keep working
#[test]
#[allow(clippy::unwrap_used)]
fn given_legacy_file_when_loading_then_buttons_and_missing_description_accepted() {
    // Given: A file with "Button.left" and no description
    let dir = temp_dir();
    let store = MacroStore::new(&dir).unwrap();
    fs::write(
        dir.join("legacy.json"),
        r#"{
  "name": "legacy",
  "created": "2023-11-02T08:15:30.250000",
  "events": [
    {"type": "mouse_click", "x": 1, "y": 2, "button": "Button.left", "pressed": true, "timestamp": 0.0},
    {"type": "mouse_scroll", "x": 1, "y": 2, "dx": 0, "dy": -3, "timestamp": 0.4}
  ]
}"#,
    )
    .unwrap();

    // When: Loading
    let loaded = store.load("legacy").unwrap();

    // Then: Parsed with an empty description
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.description(), "");
    assert!(matches!(
        loaded.events()[0],
        crate::Event::MouseClick {
            button: MouseButton::Left,
            ..
        }
    ));
    let _ = fs::remove_dir_all(&dir);
}
