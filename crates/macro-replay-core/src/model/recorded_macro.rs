use crate::model::Event;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A named, sealed, ordered sequence of timestamped input events.
///
/// Serializes to the macro file schema:
/// `{"name", "description", "created", "events": [...]}` where `created` is an
/// ISO-8601 local timestamp without offset.
///
/// A `Macro` has no mutating methods. Renaming produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macro {
    name: String,
    #[serde(default)]
    description: String,
    created: NaiveDateTime,
    events: Vec<Event>,
}

/// Per-kind event counts of a macro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MacroStats {
    /// Button presses (releases are not counted).
    pub clicks: usize,
    /// Key presses (releases are not counted).
    pub key_presses: usize,
    /// Pointer moves.
    pub moves: usize,
    /// Wheel events.
    pub scrolls: usize,
}

impl Macro {
    /// Build a macro from parts.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        created: NaiveDateTime,
        events: Vec<Event>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            created: truncate_to_micros(created),
            events,
        }
    }

    /// Seal a finished recording.
    ///
    /// The macro is named `macro_<YYYYMMDD_HHMMSS>` after `created` and gets a
    /// description summarizing clicks, key presses and duration.
    pub fn seal(events: Vec<Event>, created: NaiveDateTime) -> Self {
        let name = format!("macro_{}", created.format("%Y%m%d_%H%M%S"));
        let mut sealed = Self::new(name, String::new(), created, events);
        sealed.description = sealed.summary();
        sealed
    }

    /// Copy of this macro under a new name and description.
    pub fn renamed(&self, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            created: self.created,
            events: self.events.clone(),
        }
    }

    /// Macro name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Local time the macro was sealed.
    pub fn created(&self) -> NaiveDateTime {
        self.created
    }

    /// Events in recording order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when there is nothing to replay.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Seconds from the first to the last event.
    pub fn duration(&self) -> f64 {
        self.events.last().map(Event::t).unwrap_or(0.0)
    }

    /// Count events per kind.
    pub fn stats(&self) -> MacroStats {
        self.events
            .iter()
            .fold(MacroStats::default(), |mut stats, event| {
                match event {
                    Event::MouseMove { .. } => stats.moves += 1,
                    Event::MouseClick { pressed: true, .. } => stats.clicks += 1,
                    Event::MouseClick { .. } | Event::KeyRelease { .. } => {}
                    Event::MouseScroll { .. } => stats.scrolls += 1,
                    Event::KeyPress { .. } => stats.key_presses += 1,
                }
                stats
            })
    }

    /// Human-readable summary used as the auto-generated description.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Auto-saved macro: {} clicks, {} key presses, {:.1}s duration",
            stats.clicks,
            stats.key_presses,
            self.duration()
        )
    }

    /// True when timestamps start at zero and never decrease.
    pub fn has_ordered_timestamps(&self) -> bool {
        let starts_at_zero = self.events.first().is_none_or(|e| e.t() == 0.0);
        starts_at_zero && self.events.windows(2).all(|w| w[0].t() <= w[1].t())
    }
}

/// Files are exchanged with tools that only understand microsecond precision.
fn truncate_to_micros(created: NaiveDateTime) -> NaiveDateTime {
    let micros = created.nanosecond() / 1_000 * 1_000;
    created.with_nanosecond(micros).unwrap_or(created)
}
