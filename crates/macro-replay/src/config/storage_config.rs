use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where macros are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per macro.
    pub macros_dir: PathBuf,
}
