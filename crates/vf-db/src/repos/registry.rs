//! Vendor registry repository.
//!
//! The registry holds the authoritative URLs the source classifier trusts.
//! Lookup matches the vendor name or any alias, ignoring case.

use chrono::Utc;

use vf_core::entities::VendorRegistryEntry;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_datetime, to_json};
use crate::service::FactService;
use crate::updates::registry::RegistryUpdate;

const REGISTRY_COLUMNS: &str =
    "vendor_name, aliases, trust_center, security_page, privacy_page, pricing_page, docs, updated_at";

fn row_to_entry(row: &libsql::Row) -> Result<VendorRegistryEntry, DatabaseError> {
    let aliases = row.get::<String>(1)?;
    Ok(VendorRegistryEntry {
        vendor_name: row.get::<String>(0)?,
        aliases: serde_json::from_str(&aliases)
            .map_err(|e| DatabaseError::Query(format!("invalid aliases JSON '{aliases}': {e}")))?,
        trust_center: get_opt_string(row, 2)?,
        security_page: get_opt_string(row, 3)?,
        privacy_page: get_opt_string(row, 4)?,
        pricing_page: get_opt_string(row, 5)?,
        docs: get_opt_string(row, 6)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Find the entry whose name or alias matches `name`.
pub(crate) async fn fetch_registry_entry(
    conn: &libsql::Connection,
    name: &str,
) -> Result<Option<VendorRegistryEntry>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {REGISTRY_COLUMNS} FROM vendor_registry
                 WHERE vendor_name = ?1
                    OR EXISTS (SELECT 1 FROM json_each(vendor_registry.aliases)
                               WHERE lower(json_each.value) = lower(?1))
                 ORDER BY vendor_name = ?1 DESC
                 LIMIT 1"
            ),
            [name.trim()],
        )
        .await?;
    rows.next().await?.map(|row| row_to_entry(&row)).transpose()
}

/// Insert or replace every column of `entry`.
pub(crate) async fn write_registry_entry(
    conn: &libsql::Connection,
    entry: &VendorRegistryEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO vendor_registry ({REGISTRY_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(vendor_name) DO UPDATE SET
                aliases = excluded.aliases,
                trust_center = excluded.trust_center,
                security_page = excluded.security_page,
                privacy_page = excluded.privacy_page,
                pricing_page = excluded.pricing_page,
                docs = excluded.docs,
                updated_at = excluded.updated_at"
        ),
        libsql::params![
            entry.vendor_name.as_str(),
            to_json(&entry.aliases)?,
            entry.trust_center.as_deref(),
            entry.security_page.as_deref(),
            entry.privacy_page.as_deref(),
            entry.pricing_page.as_deref(),
            entry.docs.as_deref(),
            format_datetime(entry.updated_at)
        ],
    )
    .await?;
    Ok(())
}

impl FactService {
    /// Register a vendor, replacing any entry with the same name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an empty vendor name.
    pub async fn upsert_registry_entry(
        &self,
        entry: &VendorRegistryEntry,
    ) -> Result<VendorRegistryEntry, DatabaseError> {
        if entry.vendor_name.trim().is_empty() {
            return Err(DatabaseError::InvalidState(
                "registry entry needs a vendor name".into(),
            ));
        }
        let mut entry = entry.clone();
        entry.vendor_name = entry.vendor_name.trim().to_string();
        entry.aliases.retain(|alias| !alias.trim().is_empty());
        entry.updated_at = Utc::now();

        let _gate = self.db().write_lock().await;
        write_registry_entry(self.db().conn(), &entry).await?;
        tracing::info!(vendor = %entry.vendor_name, urls = entry.urls().len(), "registry entry saved");
        Ok(entry)
    }

    /// Look up a vendor by name or alias, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn lookup_registry(
        &self,
        name: &str,
    ) -> Result<Option<VendorRegistryEntry>, DatabaseError> {
        fetch_registry_entry(self.db().conn(), name).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_registry(&self) -> Result<Vec<VendorRegistryEntry>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {REGISTRY_COLUMNS} FROM vendor_registry ORDER BY vendor_name"),
                (),
            )
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Apply a partial update to a registered vendor.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the vendor is not registered.
    pub async fn update_registry_entry(
        &self,
        vendor_name: &str,
        update: &RegistryUpdate,
    ) -> Result<VendorRegistryEntry, DatabaseError> {
        let _gate = self.db().write_lock().await;
        let mut entry = fetch_registry_entry(self.db().conn(), vendor_name)
            .await?
            .ok_or(DatabaseError::NoResult)?;
        if update.is_empty() {
            return Ok(entry);
        }
        update.apply(&mut entry);
        entry.updated_at = Utc::now();
        write_registry_entry(self.db().conn(), &entry).await?;
        tracing::info!(vendor = %entry.vendor_name, "registry entry updated");
        Ok(entry)
    }
}
