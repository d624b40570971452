//! Candidate vendor URL repository.
//!
//! Candidates are URLs seen during discovery that look vendor-owned but are
//! not in the registry. They never influence classification until a reviewer
//! confirms one and it is promoted into the registry.

use chrono::Utc;

use vf_core::entities::{CandidateVendorUrl, VendorRegistryEntry};
use vf_core::enums::{CandidateStatus, CandidateType};
use vf_core::ids::PREFIX_CANDIDATE;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_datetime, parse_enum};
use crate::repos::registry::{fetch_registry_entry, write_registry_entry};
use crate::service::FactService;

const CANDIDATE_COLUMNS: &str = "id, vendor_name, url, normalized_domain, candidate_type, confidence, \
     status, reviewed_by, notes, discovered_at, updated_at";

fn row_to_candidate(row: &libsql::Row) -> Result<CandidateVendorUrl, DatabaseError> {
    Ok(CandidateVendorUrl {
        id: row.get::<String>(0)?,
        vendor_name: row.get::<String>(1)?,
        url: row.get::<String>(2)?,
        normalized_domain: row.get::<String>(3)?,
        candidate_type: parse_enum(&row.get::<String>(4)?)?,
        confidence: row.get::<f64>(5)?,
        status: parse_enum(&row.get::<String>(6)?)?,
        reviewed_by: get_opt_string(row, 7)?,
        notes: get_opt_string(row, 8)?,
        discovered_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

async fn fetch_candidate(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<CandidateVendorUrl>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {CANDIDATE_COLUMNS} FROM candidate_vendor_urls WHERE id = ?1"),
            [id],
        )
        .await?;
    rows.next()
        .await?
        .map(|row| row_to_candidate(&row))
        .transpose()
}

async fn fetch_by_domain(
    conn: &libsql::Connection,
    vendor_name: &str,
    normalized_domain: &str,
) -> Result<Option<CandidateVendorUrl>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {CANDIDATE_COLUMNS} FROM candidate_vendor_urls
                 WHERE vendor_name = ?1 AND normalized_domain = ?2"
            ),
            [vendor_name, normalized_domain],
        )
        .await?;
    rows.next()
        .await?
        .map(|row| row_to_candidate(&row))
        .transpose()
}

async fn write_status(
    conn: &libsql::Connection,
    candidate: &CandidateVendorUrl,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE candidate_vendor_urls
         SET status = ?2, reviewed_by = ?3, notes = ?4, updated_at = ?5
         WHERE id = ?1",
        libsql::params![
            candidate.id.as_str(),
            candidate.status.as_str(),
            candidate.reviewed_by.as_deref(),
            candidate.notes.as_deref(),
            format_datetime(candidate.updated_at)
        ],
    )
    .await?;
    Ok(())
}

fn transition(candidate: &mut CandidateVendorUrl, next: CandidateStatus) -> Result<(), DatabaseError> {
    if !candidate.status.can_transition_to(next) {
        return Err(DatabaseError::InvalidState(format!(
            "candidate {} cannot go from {} to {next}",
            candidate.id, candidate.status
        )));
    }
    candidate.status = next;
    Ok(())
}

impl FactService {
    /// Record a discovered URL as a candidate for `vendor_name`.
    ///
    /// One candidate exists per vendor and normalized domain. Seeing the
    /// domain again keeps the existing row, upgrading a still-pending row to
    /// the new URL and type when the new confidence is higher. Reviewed rows
    /// are never touched.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an empty domain or a
    /// confidence outside `[0, 1]`.
    pub async fn record_candidate(
        &self,
        vendor_name: &str,
        url: &str,
        normalized_domain: &str,
        candidate_type: CandidateType,
        confidence: f64,
    ) -> Result<CandidateVendorUrl, DatabaseError> {
        let vendor_name = vendor_name.trim();
        let normalized_domain = normalized_domain.trim().to_ascii_lowercase();
        if vendor_name.is_empty() || normalized_domain.is_empty() {
            return Err(DatabaseError::InvalidState(
                "candidate needs a vendor and a domain".into(),
            ));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DatabaseError::InvalidState(format!(
                "candidate confidence {confidence} is outside [0, 1]"
            )));
        }

        let now = Utc::now();
        let _gate = self.db().write_lock().await;

        if let Some(mut existing) = fetch_by_domain(self.db().conn(), vendor_name, &normalized_domain).await? {
            if existing.status == CandidateStatus::Pending && confidence > existing.confidence {
                existing.url = url.trim().to_string();
                existing.candidate_type = candidate_type;
                existing.confidence = confidence;
                existing.updated_at = now;
                self.db()
                    .conn()
                    .execute(
                        "UPDATE candidate_vendor_urls
                         SET url = ?2, candidate_type = ?3, confidence = ?4, updated_at = ?5
                         WHERE id = ?1",
                        libsql::params![
                            existing.id.as_str(),
                            existing.url.as_str(),
                            existing.candidate_type.as_str(),
                            existing.confidence,
                            format_datetime(now)
                        ],
                    )
                    .await?;
                tracing::debug!(candidate_id = %existing.id, confidence, "candidate upgraded");
            }
            return Ok(existing);
        }

        let candidate = CandidateVendorUrl {
            id: self.db().generate_id(PREFIX_CANDIDATE).await?,
            vendor_name: vendor_name.to_string(),
            url: url.trim().to_string(),
            normalized_domain,
            candidate_type,
            confidence,
            status: CandidateStatus::Pending,
            reviewed_by: None,
            notes: None,
            discovered_at: now,
            updated_at: now,
        };
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO candidate_vendor_urls ({CANDIDATE_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                libsql::params![
                    candidate.id.as_str(),
                    candidate.vendor_name.as_str(),
                    candidate.url.as_str(),
                    candidate.normalized_domain.as_str(),
                    candidate.candidate_type.as_str(),
                    candidate.confidence,
                    candidate.status.as_str(),
                    candidate.reviewed_by.as_deref(),
                    candidate.notes.as_deref(),
                    format_datetime(candidate.discovered_at),
                    format_datetime(candidate.updated_at)
                ],
            )
            .await?;

        tracing::info!(
            candidate_id = %candidate.id,
            vendor = vendor_name,
            domain = %candidate.normalized_domain,
            candidate_type = %candidate_type,
            "candidate vendor url recorded"
        );
        Ok(candidate)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no candidate has this id.
    pub async fn get_candidate(&self, id: &str) -> Result<CandidateVendorUrl, DatabaseError> {
        fetch_candidate(self.db().conn(), id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    /// Candidates, newest first, optionally narrowed by vendor and status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_candidates(
        &self,
        vendor_name: Option<&str>,
        status: Option<CandidateStatus>,
    ) -> Result<Vec<CandidateVendorUrl>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(vendor) = vendor_name {
            params.push(libsql::Value::Text(vendor.trim().to_string()));
            conditions.push(format!("vendor_name = ?{}", params.len()));
        }
        if let Some(status) = status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
            conditions.push(format!("status = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidate_vendor_urls {where_clause}
             ORDER BY discovered_at DESC, rowid DESC"
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut candidates = Vec::new();
        while let Some(row) = rows.next().await? {
            candidates.push(row_to_candidate(&row)?);
        }
        Ok(candidates)
    }

    /// Confirm or reject a candidate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if `decision` is not `Confirmed`
    /// or `Rejected`, or the candidate's status does not allow it.
    pub async fn review_candidate(
        &self,
        id: &str,
        decision: CandidateStatus,
        reviewed_by: &str,
        notes: Option<&str>,
    ) -> Result<CandidateVendorUrl, DatabaseError> {
        if !matches!(decision, CandidateStatus::Confirmed | CandidateStatus::Rejected) {
            return Err(DatabaseError::InvalidState(format!(
                "a review can only confirm or reject, not {decision}"
            )));
        }

        let _gate = self.db().write_lock().await;
        let mut candidate = fetch_candidate(self.db().conn(), id)
            .await?
            .ok_or(DatabaseError::NoResult)?;
        transition(&mut candidate, decision)?;
        candidate.reviewed_by = Some(reviewed_by.to_string());
        if let Some(notes) = notes {
            candidate.notes = Some(notes.to_string());
        }
        candidate.updated_at = Utc::now();
        write_status(self.db().conn(), &candidate).await?;

        tracing::info!(candidate_id = id, status = %decision, reviewed_by, "candidate reviewed");
        Ok(candidate)
    }

    /// Promote a confirmed candidate into the vendor registry.
    ///
    /// The candidate's URL fills the registry slot for its type, creating the
    /// registry entry when the vendor is not registered yet. Both writes
    /// happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the candidate is not confirmed
    /// or its type has no registry field.
    pub async fn promote_candidate(
        &self,
        id: &str,
        promoted_by: &str,
    ) -> Result<(CandidateVendorUrl, VendorRegistryEntry), DatabaseError> {
        let now = Utc::now();
        let _gate = self.db().write_lock().await;
        let tx = self.db().conn().transaction().await?;

        let mut candidate = fetch_candidate(&tx, id).await?.ok_or(DatabaseError::NoResult)?;
        let Some(url_type) = candidate.candidate_type.registry_type() else {
            return Err(DatabaseError::InvalidState(format!(
                "candidate {id} is a {} page and cannot be promoted",
                candidate.candidate_type
            )));
        };
        transition(&mut candidate, CandidateStatus::Promoted)?;
        candidate.reviewed_by = Some(promoted_by.to_string());
        candidate.updated_at = now;
        write_status(&tx, &candidate).await?;

        let mut entry = fetch_registry_entry(&tx, &candidate.vendor_name)
            .await?
            .unwrap_or_else(|| VendorRegistryEntry::new(candidate.vendor_name.clone()));
        entry.set_url(url_type, candidate.url.clone());
        entry.updated_at = now;
        write_registry_entry(&tx, &entry).await?;

        tx.commit().await?;
        tracing::info!(
            candidate_id = id,
            vendor = %entry.vendor_name,
            url_type = %url_type,
            promoted_by,
            "candidate promoted into registry"
        );
        Ok((candidate, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;
    use vf_core::enums::UrlType;

    #[tokio::test]
    async fn same_domain_is_recorded_once() {
        let svc = test_service().await;
        let first = svc
            .record_candidate("Tabnine", "https://trust.tabnine.com", "tabnine.com", CandidateType::Unknown, 0.4)
            .await
            .unwrap();
        let second = svc
            .record_candidate(
                "TABNINE",
                "https://trust.tabnine.com/soc2",
                "Tabnine.com",
                CandidateType::TrustCenter,
                0.8,
            )
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.candidate_type, CandidateType::TrustCenter);
        assert_eq!(second.url, "https://trust.tabnine.com/soc2");
        let all = svc.list_candidates(Some("tabnine"), None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!((all[0].confidence - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn lower_confidence_does_not_downgrade() {
        let svc = test_service().await;
        svc.record_candidate("Acme", "https://trust.acme.io", "acme.io", CandidateType::TrustCenter, 0.9)
            .await
            .unwrap();
        let again = svc
            .record_candidate("Acme", "https://acme.io/blog", "acme.io", CandidateType::Unknown, 0.2)
            .await
            .unwrap();
        assert_eq!(again.candidate_type, CandidateType::TrustCenter);
    }

    #[tokio::test]
    async fn out_of_range_confidence_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .record_candidate("Acme", "https://acme.io", "acme.io", CandidateType::Docs, 1.5)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn promotion_requires_confirmation() {
        let svc = test_service().await;
        let candidate = svc
            .record_candidate("Acme", "https://acme.io/security", "acme.io", CandidateType::SecurityPage, 0.7)
            .await
            .unwrap();

        let err = svc.promote_candidate(&candidate.id, "reviewer").await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));

        svc.review_candidate(&candidate.id, CandidateStatus::Confirmed, "reviewer", Some("checked"))
            .await
            .unwrap();
        let (promoted, entry) = svc.promote_candidate(&candidate.id, "reviewer").await.unwrap();

        assert_eq!(promoted.status, CandidateStatus::Promoted);
        assert_eq!(promoted.notes.as_deref(), Some("checked"));
        assert_eq!(entry.url_for(UrlType::SecurityPage), Some("https://acme.io/security"));
        let registered = svc.lookup_registry("acme").await.unwrap().unwrap();
        assert_eq!(registered, entry);
    }

    #[tokio::test]
    async fn status_pages_cannot_be_promoted() {
        let svc = test_service().await;
        let candidate = svc
            .record_candidate("Acme", "https://status.acme.io", "status.acme.io", CandidateType::StatusPage, 0.9)
            .await
            .unwrap();
        svc.review_candidate(&candidate.id, CandidateStatus::Confirmed, "reviewer", None)
            .await
            .unwrap();

        let err = svc.promote_candidate(&candidate.id, "reviewer").await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        assert_eq!(
            svc.get_candidate(&candidate.id).await.unwrap().status,
            CandidateStatus::Confirmed
        );
        assert!(svc.lookup_registry("Acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_candidates_are_final() {
        let svc = test_service().await;
        let candidate = svc
            .record_candidate("Acme", "https://acme-reviews.net", "acme-reviews.net", CandidateType::Unknown, 0.3)
            .await
            .unwrap();
        svc.review_candidate(&candidate.id, CandidateStatus::Rejected, "reviewer", None)
            .await
            .unwrap();

        let err = svc
            .review_candidate(&candidate.id, CandidateStatus::Confirmed, "reviewer", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
        let pending = svc
            .list_candidates(None, Some(CandidateStatus::Pending))
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn review_cannot_promote_directly() {
        let svc = test_service().await;
        let candidate = svc
            .record_candidate("Acme", "https://docs.acme.io", "docs.acme.io", CandidateType::Docs, 0.6)
            .await
            .unwrap();
        let err = svc
            .review_candidate(&candidate.id, CandidateStatus::Promoted, "reviewer", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }
}
