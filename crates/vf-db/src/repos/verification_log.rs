//! Verification log repository.
//!
//! Append-only: entries are inserted by the fact transitions in
//! [`facts`](super::facts) and never updated or deleted (the schema enforces
//! this with triggers). Queries filter by fact, action and method.

use chrono::{DateTime, Utc};

use vf_core::entities::{FactVerificationLogEntry, VendorFact};
use vf_core::enums::{VerificationAction, VerificationMethod, VerificationStatus};
use vf_core::ids::PREFIX_VERIFICATION_LOG;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_datetime, parse_enum, parse_optional_enum};
use crate::service::FactService;

const LOG_COLUMNS: &str = "id, fact_id, action, previous_value, new_value, previous_status, new_status, \
     method, http_status, performed_by, confidence_delta, notes, research_log_id, created_at";

/// Filter criteria for verification-log queries.
#[derive(Debug, Default)]
pub struct LogFilter {
    pub fact_id: Option<String>,
    pub action: Option<VerificationAction>,
    pub method: Option<VerificationMethod>,
    pub limit: Option<u32>,
}

/// Who or what caused a transition.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Attribution<'a> {
    pub method: VerificationMethod,
    pub performed_by: Option<&'a str>,
    pub research_log_id: Option<&'a str>,
    pub http_status: Option<u16>,
    pub notes: Option<&'a str>,
}

impl<'a> Attribution<'a> {
    pub const fn new(method: VerificationMethod) -> Self {
        Self {
            method,
            performed_by: None,
            research_log_id: None,
            http_status: None,
            notes: None,
        }
    }

    pub const fn by(mut self, performed_by: &'a str) -> Self {
        self.performed_by = Some(performed_by);
        self
    }

    pub const fn research_log(mut self, research_log_id: Option<&'a str>) -> Self {
        self.research_log_id = research_log_id;
        self
    }
}

/// Draft a log entry for the transition `before -> after`. The id is assigned
/// on insert.
pub(crate) fn draft_entry(
    before: Option<&VendorFact>,
    after: &VendorFact,
    action: VerificationAction,
    attribution: Attribution<'_>,
    now: DateTime<Utc>,
) -> FactVerificationLogEntry {
    FactVerificationLogEntry {
        id: String::new(),
        fact_id: after.id.clone(),
        action,
        previous_value: before.map(|b| b.value.clone()),
        new_value: Some(after.value.clone()),
        previous_status: before.map(|b| b.verification_status),
        new_status: after.verification_status,
        method: attribution.method,
        http_status: attribution.http_status,
        performed_by: attribution.performed_by.map(String::from),
        confidence_delta: before.map(|b| round_delta(after.confidence_score - b.confidence_score)),
        notes: attribution.notes.map(String::from),
        research_log_id: attribution.research_log_id.map(String::from),
        created_at: now,
    }
}

/// Add `extra` to an entry's notes, after any caller-supplied text.
pub(crate) fn append_note(notes: &mut Option<String>, extra: impl Into<String>) {
    let extra = extra.into();
    *notes = Some(match notes.take() {
        Some(existing) if !existing.is_empty() => format!("{existing}; {extra}"),
        _ => extra,
    });
}

fn round_delta(delta: f64) -> f64 {
    (delta * 1_000_000.0).round() / 1_000_000.0
}

fn row_to_entry(row: &libsql::Row) -> Result<FactVerificationLogEntry, DatabaseError> {
    Ok(FactVerificationLogEntry {
        id: row.get::<String>(0)?,
        fact_id: row.get::<String>(1)?,
        action: parse_enum(&row.get::<String>(2)?)?,
        previous_value: get_opt_string(row, 3)?,
        new_value: get_opt_string(row, 4)?,
        previous_status: parse_optional_enum(get_opt_string(row, 5)?.as_deref())?,
        new_status: parse_enum(&row.get::<String>(6)?)?,
        method: parse_enum(&row.get::<String>(7)?)?,
        http_status: row
            .get::<Option<i64>>(8)?
            .map(|s| {
                u16::try_from(s)
                    .map_err(|_| DatabaseError::Query(format!("http_status out of range: {s}")))
            })
            .transpose()?,
        performed_by: get_opt_string(row, 9)?,
        confidence_delta: row.get::<Option<f64>>(10)?,
        notes: get_opt_string(row, 11)?,
        research_log_id: get_opt_string(row, 12)?,
        created_at: parse_datetime(&row.get::<String>(13)?)?,
    })
}

impl FactService {
    /// Insert a drafted entry on `conn` (normally an open transaction),
    /// assigning its id.
    pub(crate) async fn insert_log_entry(
        &self,
        conn: &libsql::Connection,
        mut entry: FactVerificationLogEntry,
    ) -> Result<FactVerificationLogEntry, DatabaseError> {
        entry.id = self.db().generate_id(PREFIX_VERIFICATION_LOG).await?;
        conn.execute(
            &format!(
                "INSERT INTO fact_verification_log ({LOG_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            libsql::params![
                entry.id.as_str(),
                entry.fact_id.as_str(),
                entry.action.as_str(),
                entry.previous_value.as_deref(),
                entry.new_value.as_deref(),
                entry.previous_status.map(VerificationStatus::as_str),
                entry.new_status.as_str(),
                entry.method.as_str(),
                entry.http_status.map(i64::from),
                entry.performed_by.as_deref(),
                entry.confidence_delta,
                entry.notes.as_deref(),
                entry.research_log_id.as_deref(),
                format_datetime(entry.created_at)
            ],
        )
        .await?;
        Ok(entry)
    }

    /// Query log entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_verification_log(
        &self,
        filter: &LogFilter,
    ) -> Result<Vec<FactVerificationLogEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref fact_id) = filter.fact_id {
            params.push(libsql::Value::Text(fact_id.clone()));
            conditions.push(format!("fact_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(method) = filter.method {
            params.push(libsql::Value::Text(method.as_str().to_string()));
            conditions.push(format!("method = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(500);
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM fact_verification_log {where_clause}
             ORDER BY created_at, rowid LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Every log entry for one fact, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn fact_log(&self, fact_id: &str) -> Result<Vec<FactVerificationLogEntry>, DatabaseError> {
        self.query_verification_log(&LogFilter {
            fact_id: Some(fact_id.to_string()),
            limit: Some(u32::MAX),
            ..LogFilter::default()
        })
        .await
    }
}
