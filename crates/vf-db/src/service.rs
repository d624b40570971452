//! Service layer orchestrating fact-store mutations with the verification
//! log and the JSONL trail.
//!
//! `FactService` wraps `FactDb` (raw database access) and `TrailWriter` (JSONL
//! mirror). All repo methods are implemented as `impl FactService` blocks.

use std::path::PathBuf;

use chrono::Duration;
use vf_config::VfConfig;
use vf_core::entities::{FactKey, FactVerificationLogEntry};

use crate::FactDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;
use crate::trail::writer::{TrailRecord, TrailWriter};

/// Orchestrates fact-store mutations.
///
/// Every mutation method follows this protocol:
/// 1. Acquire the write gate and begin a transaction
/// 2. Re-read the rows it changes
/// 3. Apply the transition in memory, then write with a version check
/// 4. Append verification-log entries (inside the transaction)
/// 5. Commit, then mirror the log entries to the trail
///
/// A version mismatch aborts the transaction and the whole operation is
/// re-run under [`RetryConfig`].
pub struct FactService {
    db: FactDb,
    trail: TrailWriter,
    retry: RetryConfig,
    default_ttl_days: Option<u32>,
    failure_recheck: Duration,
}

impl FactService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `trail_dir` - Directory for JSONL trail files. `None` disables the trail.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the trail
    /// directory cannot be created.
    pub async fn new_local(
        db_path: &str,
        trail_dir: Option<PathBuf>,
    ) -> Result<Self, DatabaseError> {
        let db = FactDb::open_local(db_path).await?;
        let trail = match trail_dir {
            Some(dir) => TrailWriter::new(dir)?,
            None => TrailWriter::disabled(),
        };
        Ok(Self::from_db(db, trail))
    }

    /// Open the store described by a loaded configuration.
    ///
    /// Creates the database's parent directory when needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory, database or trail cannot be
    /// created.
    pub async fn from_config(config: &VfConfig) -> Result<Self, DatabaseError> {
        let store = &config.store;
        if !store.is_in_memory() {
            if let Some(parent) = store.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Other(e.into()))?;
            }
        }
        let db_path = store.db_path.to_string_lossy();
        let service = Self::new_local(&db_path, store.trail_dir.clone()).await?;
        Ok(service
            .with_retry(RetryConfig::with_max_attempts(config.research.write_retries))
            .with_freshness(
                config.freshness.default_ttl_days,
                config.freshness.failure_recheck_days,
            ))
    }

    /// Create from an existing `FactDb` (for testing).
    #[must_use]
    pub fn from_db(db: FactDb, trail: TrailWriter) -> Self {
        Self {
            db,
            trail,
            retry: RetryConfig::default(),
            default_ttl_days: None,
            failure_recheck: Duration::days(1),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Override the TTL of non-critical facts and the delay before a failed
    /// source is checked again.
    #[must_use]
    pub fn with_freshness(mut self, default_ttl_days: u32, failure_recheck_days: u32) -> Self {
        self.default_ttl_days = Some(default_ttl_days);
        self.failure_recheck = Duration::days(i64::from(failure_recheck_days));
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &FactDb {
        &self.db
    }

    /// Access the trail writer.
    #[must_use]
    pub const fn trail(&self) -> &TrailWriter {
        &self.trail
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub(crate) const fn default_ttl_days(&self) -> Option<u32> {
        self.default_ttl_days
    }

    pub(crate) const fn failure_recheck(&self) -> Duration {
        self.failure_recheck
    }

    /// Commit `tx`, then mirror the entries it logged.
    ///
    /// The database is authoritative; a failed trail append is logged and
    /// does not undo the commit.
    pub(crate) async fn commit(
        &self,
        tx: libsql::Transaction,
        logged: Vec<(FactKey, FactVerificationLogEntry)>,
    ) -> Result<(), DatabaseError> {
        tx.commit().await?;
        for (key, entry) in logged {
            let entry_id = entry.id.clone();
            if let Err(e) = self.trail.append(&TrailRecord::new(key, entry)) {
                tracing::warn!(%e, entry_id, "trail append failed");
            }
        }
        Ok(())
    }
}
