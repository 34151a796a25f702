//! Macro files on disk.
//!
//! One pretty-printed JSON file per macro, `<name>.json`, in a single
//! directory. Writes go to a temp file first and are renamed into place so a
//! crash never leaves a truncated macro behind.

use crate::{EngineError, EngineResult, model::Macro};

use std::{
    fs,
    io::{self, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

const EXTENSION: &str = "json";

/// Listing entry for a saved macro.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroSummary {
    /// Macro name.
    pub name: String,
    /// Stored description.
    pub description: String,
    /// Local time the macro was sealed.
    pub created: NaiveDateTime,
    /// Number of events.
    pub events_count: usize,
}

impl From<&Macro> for MacroSummary {
    fn from(recorded: &Macro) -> Self {
        Self {
            name: recorded.name().to_string(),
            description: recorded.description().to_string(),
            created: recorded.created(),
            events_count: recorded.len(),
        }
    }
}

/// Directory of saved macros.
#[derive(Debug, Clone)]
pub struct MacroStore {
    dir: PathBuf,
}

impl MacroStore {
    /// Open `dir`, creating it if missing.
    #[track_caller]
    #[instrument]
    pub fn new(dir: impl AsRef<Path> + std::fmt::Debug) -> EngineResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            debug!(dir = ?dir, "Created macros directory");
        }
        Ok(Self { dir })
    }

    /// Storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a macro with this name is stored in.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{EXTENSION}", file_stem(name)))
    }

    /// Write `recorded`, replacing any macro with the same name.
    #[track_caller]
    #[instrument(skip(self, recorded), fields(name = recorded.name()))]
    pub fn save(&self, recorded: &Macro) -> EngineResult<PathBuf> {
        let path = self.path_for(recorded.name());
        let contents = serde_json::to_string_pretty(recorded)?;

        let temp_path = path.with_extension(format!("{EXTENSION}.tmp"));
        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(contents.as_bytes())?;
        temp_file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        info!(path = ?path, events = recorded.len(), "Macro saved (atomic write)");
        Ok(path)
    }

    /// Read the macro stored under `name`.
    ///
    /// # Errors
    ///
    /// `MacroNotFound` when no such file exists, `Serialization` when it is
    /// not a valid macro.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn load(&self, name: &str) -> EngineResult<Macro> {
        let path = self.path_for(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(EngineError::MacroNotFound {
                    name: name.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let recorded: Macro = serde_json::from_str(&contents)?;
        debug!(path = ?path, events = recorded.len(), "Macro loaded");
        Ok(recorded)
    }

    /// Summaries of every readable macro, newest first.
    ///
    /// Files that fail to parse are skipped with a warning.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn list(&self) -> EngineResult<Vec<MacroSummary>> {
        let mut summaries = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }

            let parsed = fs::read_to_string(&path)
                .map_err(EngineError::from)
                .and_then(|s| serde_json::from_str::<Macro>(&s).map_err(EngineError::from));

            match parsed {
                Ok(recorded) => summaries.push(MacroSummary::from(&recorded)),
                Err(e) => warn!(path = ?path, error = %e, "Skipping unreadable macro file"),
            }
        }

        summaries.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.name.cmp(&b.name)));
        Ok(summaries)
    }

    /// Remove the macro stored under `name`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn delete(&self, name: &str) -> EngineResult<()> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = ?path, "Macro deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(EngineError::MacroNotFound {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map a macro name to a safe file stem.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "macro".to_string()
    } else {
        stem.to_string()
    }
}

