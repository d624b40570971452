//! Research log repository: one row per research session.

use chrono::Utc;

use vf_core::entities::{AuditResult, ResearchLog};
use vf_core::enums::{ConfidenceLevel, ResearchMode};
use vf_core::ids::PREFIX_RESEARCH_LOG;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, format_optional_datetime, get_opt_string, get_u32, parse_datetime,
    parse_enum, parse_optional_datetime, parse_optional_enum, parse_optional_json, to_json,
};
use crate::service::FactService;

const RESEARCH_LOG_COLUMNS: &str = "id, vendor_name, product_name, mode, started_at, completed_at, \
     total_facts, facts_in_report, dropped_count, unsupported_count, confidence_score, \
     confidence_level, audit, cancelled";

fn row_to_research_log(row: &libsql::Row) -> Result<ResearchLog, DatabaseError> {
    Ok(ResearchLog {
        id: row.get::<String>(0)?,
        vendor_name: row.get::<String>(1)?,
        product_name: row.get::<String>(2)?,
        mode: parse_enum(&row.get::<String>(3)?)?,
        started_at: parse_datetime(&row.get::<String>(4)?)?,
        completed_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        total_facts: get_u32(row, 6)?,
        facts_in_report: get_u32(row, 7)?,
        dropped_count: get_u32(row, 8)?,
        unsupported_count: get_u32(row, 9)?,
        confidence_score: row.get::<Option<f64>>(10)?,
        confidence_level: parse_optional_enum(get_opt_string(row, 11)?.as_deref())?,
        audit: parse_optional_json(get_opt_string(row, 12)?.as_deref())?,
        cancelled: row.get::<i64>(13)? != 0,
    })
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl FactService {
    /// Open a research log for a session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an empty vendor name.
    pub async fn start_research_log(
        &self,
        vendor_name: &str,
        product_name: &str,
        mode: ResearchMode,
    ) -> Result<ResearchLog, DatabaseError> {
        let vendor_name = vendor_name.trim();
        if vendor_name.is_empty() {
            return Err(DatabaseError::InvalidState(
                "research log needs a vendor name".into(),
            ));
        }
        let log = ResearchLog {
            id: self.db().generate_id(PREFIX_RESEARCH_LOG).await?,
            vendor_name: vendor_name.to_string(),
            product_name: product_name.trim().to_string(),
            mode,
            started_at: Utc::now(),
            completed_at: None,
            total_facts: 0,
            facts_in_report: 0,
            dropped_count: 0,
            unsupported_count: 0,
            confidence_score: None,
            confidence_level: None,
            audit: None,
            cancelled: false,
        };

        let _gate = self.db().write_lock().await;
        self.db()
            .conn()
            .execute(
                "INSERT INTO research_logs (id, vendor_name, product_name, mode, started_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    log.id.as_str(),
                    log.vendor_name.as_str(),
                    log.product_name.as_str(),
                    log.mode.as_str(),
                    format_datetime(log.started_at)
                ],
            )
            .await?;
        tracing::info!(research_log_id = %log.id, vendor = %log.vendor_name, mode = %mode, "research started");
        Ok(log)
    }

    /// Close a research log, storing the audit summary when there is one.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown id and
    /// `DatabaseError::InvalidState` if the log is already closed.
    pub async fn finish_research_log(
        &self,
        id: &str,
        audit: Option<&AuditResult>,
        cancelled: bool,
    ) -> Result<ResearchLog, DatabaseError> {
        let _gate = self.db().write_lock().await;
        let mut log = self.fetch_research_log(id).await?;
        if log.completed_at.is_some() {
            return Err(DatabaseError::InvalidState(format!(
                "research log {id} is already finished"
            )));
        }

        log.completed_at = Some(Utc::now());
        log.cancelled = cancelled;
        if let Some(audit) = audit {
            log.total_facts = audit.total_facts;
            log.facts_in_report = audit.facts_in_report;
            log.dropped_count = count_u32(audit.dropped_facts.len());
            log.unsupported_count = count_u32(audit.unsupported_claims.len());
            log.confidence_score = Some(audit.confidence_score);
            log.confidence_level = Some(audit.confidence_level);
            log.audit = Some(audit.clone());
        }

        self.db()
            .conn()
            .execute(
                "UPDATE research_logs SET
                    completed_at = ?2, total_facts = ?3, facts_in_report = ?4, dropped_count = ?5,
                    unsupported_count = ?6, confidence_score = ?7, confidence_level = ?8,
                    audit = ?9, cancelled = ?10
                 WHERE id = ?1",
                libsql::params![
                    log.id.as_str(),
                    format_optional_datetime(log.completed_at),
                    i64::from(log.total_facts),
                    i64::from(log.facts_in_report),
                    i64::from(log.dropped_count),
                    i64::from(log.unsupported_count),
                    log.confidence_score,
                    log.confidence_level.map(ConfidenceLevel::as_str),
                    log.audit.as_ref().map(to_json).transpose()?,
                    i64::from(log.cancelled)
                ],
            )
            .await?;

        tracing::info!(
            research_log_id = id,
            cancelled,
            confidence = ?log.confidence_score,
            "research finished"
        );
        Ok(log)
    }

    async fn fetch_research_log(&self, id: &str) -> Result<ResearchLog, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {RESEARCH_LOG_COLUMNS} FROM research_logs WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_research_log(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no research log has this id.
    pub async fn get_research_log(&self, id: &str) -> Result<ResearchLog, DatabaseError> {
        self.fetch_research_log(id).await
    }

    /// Research logs, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_research_logs(
        &self,
        vendor_name: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ResearchLog>, DatabaseError> {
        let mut rows = match vendor_name {
            Some(vendor) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {RESEARCH_LOG_COLUMNS} FROM research_logs
                             WHERE vendor_name = ?1
                             ORDER BY started_at DESC, rowid DESC LIMIT {limit}"
                        ),
                        [vendor.trim()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {RESEARCH_LOG_COLUMNS} FROM research_logs
                             ORDER BY started_at DESC, rowid DESC LIMIT {limit}"
                        ),
                        (),
                    )
                    .await?
            }
        };
        let mut logs = Vec::new();
        while let Some(row) = rows.next().await? {
            logs.push(row_to_research_log(&row)?);
        }
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;

    fn audit() -> AuditResult {
        AuditResult {
            total_facts: 10,
            facts_in_report: 8,
            dropped_facts: Vec::new(),
            unsupported_claims: Vec::new(),
            inclusion_rate: 0.8,
            drop_penalty: 0.1,
            hallucination_penalty: 0.1,
            confidence_score: 0.6,
            confidence_level: ConfidenceLevel::Medium,
            notes: vec!["reviewer response was partial".into()],
        }
    }

    #[tokio::test]
    async fn start_then_finish_with_audit() {
        let svc = test_service().await;
        let started = svc
            .start_research_log("Tabnine", "Tabnine Enterprise", ResearchMode::Cached)
            .await
            .unwrap();
        assert!(started.id.starts_with("rsl-"));
        assert!(started.completed_at.is_none());

        let finished = svc
            .finish_research_log(&started.id, Some(&audit()), false)
            .await
            .unwrap();
        assert_eq!(finished.total_facts, 10);
        assert_eq!(finished.confidence_level, Some(ConfidenceLevel::Medium));

        let stored = svc.get_research_log(&started.id).await.unwrap();
        assert_eq!(stored, finished);
        assert_eq!(stored.audit.unwrap().notes, vec!["reviewer response was partial".to_string()]);
    }

    #[tokio::test]
    async fn cancelled_session_without_audit() {
        let svc = test_service().await;
        let started = svc
            .start_research_log("Acme", "", ResearchMode::Full)
            .await
            .unwrap();
        let finished = svc.finish_research_log(&started.id, None, true).await.unwrap();
        assert!(finished.cancelled);
        assert_eq!(finished.confidence_score, None);

        let again = svc.finish_research_log(&started.id, None, false).await;
        assert!(matches!(again, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn list_filters_by_vendor() {
        let svc = test_service().await;
        svc.start_research_log("Acme", "", ResearchMode::Cached).await.unwrap();
        svc.start_research_log("Tabnine", "", ResearchMode::Cached).await.unwrap();
        svc.start_research_log("acme", "Acme Cloud", ResearchMode::Full).await.unwrap();

        let acme = svc.list_research_logs(Some("ACME"), 10).await.unwrap();
        assert_eq!(acme.len(), 2);
        assert_eq!(acme[0].product_name, "Acme Cloud");
        assert_eq!(svc.list_research_logs(None, 2).await.unwrap().len(), 2);
    }
}
