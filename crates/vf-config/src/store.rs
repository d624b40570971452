//! Fact store location.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_db_path() -> PathBuf {
    PathBuf::from(".vendorfacts/facts.db")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// libSQL database file. `:memory:` keeps everything in process.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory for the per-vendor JSONL mirror of the verification log.
    /// Unset disables the mirror.
    #[serde(default)]
    pub trail_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            trail_dir: None,
        }
    }
}

impl StoreConfig {
    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == ":memory:"
    }
}
