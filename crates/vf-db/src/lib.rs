//! # vf-db
//!
//! libSQL persistence for the vendor fact engine.
//!
//! Holds the fact cache (`vendor_facts`), its append-only verification log,
//! discovered candidate URLs, the vendor registry and per-session research
//! logs. All mutations go through [`service::FactService`], which serializes
//! multi-statement writes, checks row versions on update, and mirrors every
//! verification-log entry into an optional JSONL trail.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
pub mod trail;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};

/// Database handle: one libSQL connection plus the write gate.
///
/// The connection is shared by every caller, so a transaction opened on it is
/// visible to all of them. Writers hold the gate for the lifetime of their
/// transaction.
///
/// Reads (`get_current_fact`, `lookup_registry`, listings) do not take the
/// gate. A read that runs while another task is mid-write sees that write's
/// uncommitted rows, e.g. a disputed fact whose replacement is inserted but
/// not yet committed. Writes never act on such a read: every write re-reads
/// its row under the gate and checks `version` before updating.
pub struct FactDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    write_gate: Mutex<()>,
}

impl FactDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let fact_db = Self {
            db,
            conn,
            write_gate: Mutex::new(()),
        };
        fact_db.run_migrations().await?;
        Ok(fact_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Acquire the write gate. Held across `BEGIN` .. `COMMIT`.
    pub async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"fct-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> FactDb {
        FactDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let tables = [
            "vendor_facts",
            "fact_verification_log",
            "candidate_vendor_urls",
            "vendor_registry",
            "research_logs",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            assert!(
                rows.next().await.unwrap().is_some(),
                "table '{table}' should exist"
            );
        }
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in vf_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
            assert_eq!(id.len(), prefix.len() + 9, "{id}");
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("fct").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn verification_log_rejects_update_and_delete() {
        let db = test_db().await;
        db.conn()
            .execute_batch(
                "INSERT INTO vendor_facts (id, vendor_name, fact_category, fact_key, value, first_found_at, last_updated_at)
                 VALUES ('fct-1', 'Acme', 'general', 'sso_support', 'SAML', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z');
                 INSERT INTO fact_verification_log (id, fact_id, action, new_status, method, created_at)
                 VALUES ('vlg-1', 'fct-1', 'created', 'pending', 'manual', '2026-01-01T00:00:00Z');",
            )
            .await
            .unwrap();

        let update = db
            .conn()
            .execute("UPDATE fact_verification_log SET notes = 'x' WHERE id = 'vlg-1'", ())
            .await;
        assert!(update.is_err());
        let delete = db
            .conn()
            .execute("DELETE FROM fact_verification_log WHERE id = 'vlg-1'", ())
            .await;
        assert!(delete.is_err());
        let delete_fact = db
            .conn()
            .execute("DELETE FROM vendor_facts WHERE id = 'fct-1'", ())
            .await;
        assert!(delete_fact.is_err());
    }

    #[tokio::test]
    async fn live_key_is_unique() {
        let db = test_db().await;
        let insert = "INSERT INTO vendor_facts (id, vendor_name, fact_category, fact_key, value, first_found_at, last_updated_at)
                      VALUES (?1, ?2, 'certification', 'soc2_type2', 'SOC 2', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')";
        db.conn()
            .execute(insert, libsql::params!["fct-1", "Acme"])
            .await
            .unwrap();
        // vendor name comparison ignores case
        let dup = db.conn().execute(insert, libsql::params!["fct-2", "ACME"]).await;
        assert!(dup.is_err(), "second live row for the same key must be rejected");
    }
}
