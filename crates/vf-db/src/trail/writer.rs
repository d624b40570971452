//! JSONL trail writer.
//!
//! Appends [`TrailRecord`]s to per-vendor files. Uses
//! `serde_jsonlines::append_json_lines` for per-line appends.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vf_core::entities::{FactKey, FactVerificationLogEntry};

use crate::error::DatabaseError;

/// One line of the trail: a verification-log entry plus the key it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailRecord {
    /// Record format version.
    pub v: u8,
    pub key: FactKey,
    pub entry: FactVerificationLogEntry,
}

impl TrailRecord {
    #[must_use]
    pub const fn new(key: FactKey, entry: FactVerificationLogEntry) -> Self {
        Self { v: 1, key, entry }
    }
}

/// Appends trail records to per-vendor JSONL files.
///
/// `FactService` appends only after the owning transaction commits, so a
/// rolled-back attempt leaves no line behind.
pub struct TrailWriter {
    trail_dir: PathBuf,
    enabled: bool,
}

impl TrailWriter {
    /// Create a new `TrailWriter` pointing at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created.
    pub fn new(trail_dir: PathBuf) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&trail_dir).map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(Self {
            trail_dir,
            enabled: true,
        })
    }

    /// Create a disabled writer (for testing or when no trail is configured).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            trail_dir: PathBuf::new(),
            enabled: false,
        }
    }

    /// Whether trail writing is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a record to its vendor's JSONL file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file write fails.
    pub fn append(&self, record: &TrailRecord) -> Result<(), DatabaseError> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.path_for(&record.key.vendor_name);
        serde_jsonlines::append_json_lines(&path, [record])
            .map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(())
    }

    /// Read back every record for a vendor, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file exists but cannot be read or parsed.
    pub fn read_vendor(&self, vendor_name: &str) -> Result<Vec<TrailRecord>, DatabaseError> {
        let path = self.path_for(vendor_name);
        if !self.enabled || !path.exists() {
            return Ok(Vec::new());
        }
        serde_jsonlines::json_lines::<TrailRecord, _>(&path)
            .and_then(|lines| lines.collect::<std::io::Result<Vec<_>>>())
            .map_err(|e| DatabaseError::Other(e.into()))
    }

    /// File path for a vendor: `{trail_dir}/{vendor_slug}.jsonl`.
    #[must_use]
    pub fn path_for(&self, vendor_name: &str) -> PathBuf {
        self.trail_dir.join(format!("{}.jsonl", vendor_slug(vendor_name)))
    }

    /// The directory where trail files are stored.
    #[must_use]
    pub fn trail_dir(&self) -> &Path {
        &self.trail_dir
    }
}

/// Lowercase ASCII alphanumerics, every other run collapsed to a single `-`.
#[must_use]
pub fn vendor_slug(vendor_name: &str) -> String {
    let mut slug = String::with_capacity(vendor_name.len());
    for c in vendor_name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "unnamed".to_string()
    } else {
        slug
    }
}
