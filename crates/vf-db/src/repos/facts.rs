//! Vendor fact repository: the cache, its lifecycle transitions and queries.
//!
//! Every transition re-reads the row inside a transaction, applies the
//! `vf_core` state machine in memory and writes back with a version check.
//! Conflicting values never overwrite a row: the old row is disputed and
//! linked through `superseded_by` to a new pending row that carries the new
//! value.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vf_core::critical_fields::is_critical;
use vf_core::entities::{FactKey, FactVerificationLogEntry, NewFact, VendorFact};
use vf_core::enums::{
    FactCategory, SourceStatus, VerificationAction, VerificationMethod, VerificationStatus,
};
use vf_core::ids::PREFIX_FACT;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, format_optional_datetime, get_opt_string, get_u32, parse_datetime,
    parse_enum, parse_optional_datetime, parse_optional_enum, parse_optional_json, to_json,
};
use crate::repos::verification_log::{Attribution, append_note, draft_entry};
use crate::retry::retry_on_conflict;
use crate::service::FactService;
use crate::updates::recheck::RecheckOutcome;

const FACT_COLUMNS: &str = "id, vendor_name, product_name, fact_category, fact_key, value, details, \
     context, source_url, source_title, source_snippet, source_type, verification_status, \
     confidence_score, ttl_days, verified_at, verified_by, research_log_id, expires_at, \
     source_last_checked_at, source_last_status, recheck_count, next_recheck_at, \
     recheck_priority, first_found_at, last_updated_at, superseded_by, version";

type Logged = Vec<(FactKey, FactVerificationLogEntry)>;

/// Filter criteria for fact listings.
#[derive(Debug, Default)]
pub struct FactFilter {
    pub vendor_name: Option<String>,
    pub product_name: Option<String>,
    pub category: Option<FactCategory>,
    pub status: Option<VerificationStatus>,
    /// Include rows that have been replaced.
    pub include_history: bool,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsertOutcome {
    /// `Created`, `Refreshed` or `Disputed`.
    pub action: VerificationAction,
    /// The live row for the key after the upsert.
    pub fact: VendorFact,
    /// The row that was disputed and replaced, if any.
    pub replaced: Option<VendorFact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisputeOutcome {
    pub disputed: VendorFact,
    pub replacement: Option<VendorFact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecheckResult {
    /// `Rechecked`, `MarkedStale` or `Disputed`.
    pub action: VerificationAction,
    /// The checked row after the recheck was applied.
    pub fact: VendorFact,
    /// New pending row when the source showed a different value.
    pub replacement: Option<VendorFact>,
}

pub(crate) fn row_to_fact(row: &libsql::Row) -> Result<VendorFact, DatabaseError> {
    let priority = row.get::<i64>(23)?;
    Ok(VendorFact {
        id: row.get::<String>(0)?,
        vendor_name: row.get::<String>(1)?,
        product_name: row.get::<String>(2)?,
        fact_category: parse_enum(&row.get::<String>(3)?)?,
        fact_key: row.get::<String>(4)?,
        value: row.get::<String>(5)?,
        details: parse_optional_json(get_opt_string(row, 6)?.as_deref())?,
        context: get_opt_string(row, 7)?,
        source_url: get_opt_string(row, 8)?,
        source_title: get_opt_string(row, 9)?,
        source_snippet: get_opt_string(row, 10)?,
        source_type: parse_enum(&row.get::<String>(11)?)?,
        verification_status: parse_enum(&row.get::<String>(12)?)?,
        confidence_score: row.get::<f64>(13)?,
        ttl_days: get_u32(row, 14)?,
        verified_at: parse_optional_datetime(get_opt_string(row, 15)?.as_deref())?,
        verified_by: get_opt_string(row, 16)?,
        research_log_id: get_opt_string(row, 17)?,
        expires_at: parse_optional_datetime(get_opt_string(row, 18)?.as_deref())?,
        source_last_checked_at: parse_optional_datetime(get_opt_string(row, 19)?.as_deref())?,
        source_last_status: parse_optional_enum(get_opt_string(row, 20)?.as_deref())?,
        recheck_count: get_u32(row, 21)?,
        next_recheck_at: parse_optional_datetime(get_opt_string(row, 22)?.as_deref())?,
        recheck_priority: i32::try_from(priority)
            .map_err(|_| DatabaseError::Query(format!("recheck_priority out of range: {priority}")))?,
        first_found_at: parse_datetime(&row.get::<String>(24)?)?,
        last_updated_at: parse_datetime(&row.get::<String>(25)?)?,
        superseded_by: get_opt_string(row, 26)?,
        version: row.get::<i64>(27)?,
    })
}

async fn query_facts(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<Vec<VendorFact>, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let mut facts = Vec::new();
    while let Some(row) = rows.next().await? {
        facts.push(row_to_fact(&row)?);
    }
    Ok(facts)
}

async fn fetch_fact(conn: &libsql::Connection, id: &str) -> Result<Option<VendorFact>, DatabaseError> {
    let facts = query_facts(
        conn,
        &format!("SELECT {FACT_COLUMNS} FROM vendor_facts WHERE id = ?1"),
        [id],
    )
    .await?;
    Ok(facts.into_iter().next())
}

async fn fetch_current(
    conn: &libsql::Connection,
    key: &FactKey,
) -> Result<Option<VendorFact>, DatabaseError> {
    let facts = query_facts(
        conn,
        &format!(
            "SELECT {FACT_COLUMNS} FROM vendor_facts
             WHERE vendor_name = ?1 AND product_name = ?2 AND fact_category = ?3 AND fact_key = ?4
               AND superseded_by IS NULL"
        ),
        libsql::params![
            key.vendor_name.as_str(),
            key.product_name.as_str(),
            key.fact_category.as_str(),
            key.fact_key.as_str()
        ],
    )
    .await?;
    Ok(facts.into_iter().next())
}

/// A fact that must still be live to take a transition.
async fn load_live(conn: &libsql::Connection, id: &str) -> Result<VendorFact, DatabaseError> {
    let fact = fetch_fact(conn, id).await?.ok_or(DatabaseError::NoResult)?;
    if !fact.is_live() {
        return Err(DatabaseError::InvalidState(format!(
            "fact {id} is {} and replaced by {}",
            fact.verification_status,
            fact.superseded_by.as_deref().unwrap_or("nothing")
        )));
    }
    Ok(fact)
}

async fn insert_fact(conn: &libsql::Connection, f: &VendorFact) -> Result<(), DatabaseError> {
    let details = f.details.as_ref().map(to_json).transpose()?;
    conn.execute(
        &format!(
            "INSERT INTO vendor_facts ({FACT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                     ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)"
        ),
        libsql::params![
            f.id.as_str(),
            f.vendor_name.as_str(),
            f.product_name.as_str(),
            f.fact_category.as_str(),
            f.fact_key.as_str(),
            f.value.as_str(),
            details,
            f.context.as_deref(),
            f.source_url.as_deref(),
            f.source_title.as_deref(),
            f.source_snippet.as_deref(),
            f.source_type.as_str(),
            f.verification_status.as_str(),
            f.confidence_score,
            i64::from(f.ttl_days),
            format_optional_datetime(f.verified_at),
            f.verified_by.as_deref(),
            f.research_log_id.as_deref(),
            format_optional_datetime(f.expires_at),
            format_optional_datetime(f.source_last_checked_at),
            f.source_last_status.map(SourceStatus::as_str),
            i64::from(f.recheck_count),
            format_optional_datetime(f.next_recheck_at),
            i64::from(f.recheck_priority),
            format_datetime(f.first_found_at),
            format_datetime(f.last_updated_at),
            f.superseded_by.as_deref(),
            f.version
        ],
    )
    .await?;
    Ok(())
}

/// Write every mutable column of `f` if the stored version still equals
/// `f.version`. Returns the row with its bumped version.
async fn update_fact(conn: &libsql::Connection, f: &VendorFact) -> Result<VendorFact, DatabaseError> {
    let details = f.details.as_ref().map(to_json).transpose()?;
    let affected = conn
        .execute(
            "UPDATE vendor_facts SET
                value = ?2, details = ?3, context = ?4, source_url = ?5, source_title = ?6,
                source_snippet = ?7, source_type = ?8, verification_status = ?9,
                confidence_score = ?10, ttl_days = ?11, verified_at = ?12, verified_by = ?13,
                research_log_id = ?14, expires_at = ?15, source_last_checked_at = ?16,
                source_last_status = ?17, recheck_count = ?18, next_recheck_at = ?19,
                recheck_priority = ?20, last_updated_at = ?21, superseded_by = ?22,
                version = version + 1
             WHERE id = ?1 AND version = ?23",
            libsql::params![
                f.id.as_str(),
                f.value.as_str(),
                details,
                f.context.as_deref(),
                f.source_url.as_deref(),
                f.source_title.as_deref(),
                f.source_snippet.as_deref(),
                f.source_type.as_str(),
                f.verification_status.as_str(),
                f.confidence_score,
                i64::from(f.ttl_days),
                format_optional_datetime(f.verified_at),
                f.verified_by.as_deref(),
                f.research_log_id.as_deref(),
                format_optional_datetime(f.expires_at),
                format_optional_datetime(f.source_last_checked_at),
                f.source_last_status.map(SourceStatus::as_str),
                i64::from(f.recheck_count),
                format_optional_datetime(f.next_recheck_at),
                i64::from(f.recheck_priority),
                format_datetime(f.last_updated_at),
                f.superseded_by.as_deref(),
                f.version
            ],
        )
        .await?;
    if affected == 0 {
        return Err(DatabaseError::Conflict {
            entity: "vendor_fact",
            id: f.id.clone(),
            expected_version: f.version,
        });
    }
    let mut updated = f.clone();
    updated.version += 1;
    Ok(updated)
}

/// Case- and whitespace-insensitive value equality.
fn values_match(a: &str, b: &str) -> bool {
    let fold = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    fold(a) == fold(b)
}

fn validate_new(input: &NewFact) -> Result<(), DatabaseError> {
    let key = &input.key;
    if key.vendor_name.is_empty() || key.fact_key.is_empty() {
        return Err(DatabaseError::InvalidState(format!(
            "fact key needs a vendor and a fact key: {key}"
        )));
    }
    if input.value.trim().is_empty() {
        return Err(DatabaseError::InvalidState(format!("empty value for {key}")));
    }
    Ok(())
}

/// Fold re-extracted source attribution into an existing row with the same value.
fn refresh_from(fact: &mut VendorFact, input: &NewFact, now: DateTime<Utc>) {
    fact.source_type = fact.source_type.merge(input.source_type);
    if fact.source_url.is_none() {
        fact.source_url.clone_from(&input.source_url);
    }
    if fact.source_title.is_none() {
        fact.source_title.clone_from(&input.source_title);
    }
    if fact.source_snippet.is_none() {
        fact.source_snippet.clone_from(&input.source_snippet);
    }
    if fact.context.is_none() {
        fact.context.clone_from(&input.context);
    }
    if input.details.is_some() {
        fact.details.clone_from(&input.details);
    }
    fact.last_updated_at = now;
}

/// Latest moment the stored row was written: merged, verified or rechecked.
fn last_touched(fact: &VendorFact) -> DateTime<Utc> {
    [fact.verified_at, fact.source_last_checked_at]
        .into_iter()
        .flatten()
        .fold(fact.last_updated_at, std::cmp::max)
}

/// Input for a replacement row that keeps the source of `fact` but carries `value`.
fn replacement_for(fact: &VendorFact, value: &str) -> NewFact {
    NewFact {
        key: fact.key(),
        value: value.trim().to_string(),
        details: None,
        context: None,
        source_url: fact.source_url.clone(),
        source_title: fact.source_title.clone(),
        source_snippet: None,
        source_type: fact.source_type,
        confidence: fact.confidence_score,
    }
}

impl FactService {
    /// Build a pending fact, applying the configured TTL to non-critical keys.
    fn new_fact(&self, id: String, input: NewFact, now: DateTime<Utc>) -> VendorFact {
        let mut fact = VendorFact::from_new(id, input, now);
        if let Some(ttl_days) = self.default_ttl_days() {
            if !is_critical(&fact.fact_key) {
                fact.ttl_days = ttl_days;
            }
        }
        fact
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no fact has this id.
    pub async fn get_fact(&self, id: &str) -> Result<VendorFact, DatabaseError> {
        fetch_fact(self.db().conn(), id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    /// The live row for a key, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_current_fact(&self, key: &FactKey) -> Result<Option<VendorFact>, DatabaseError> {
        fetch_current(self.db().conn(), key).await
    }

    /// Every row ever stored for a key, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn fact_history(&self, key: &FactKey) -> Result<Vec<VendorFact>, DatabaseError> {
        query_facts(
            self.db().conn(),
            &format!(
                "SELECT {FACT_COLUMNS} FROM vendor_facts
                 WHERE vendor_name = ?1 AND product_name = ?2 AND fact_category = ?3 AND fact_key = ?4
                 ORDER BY first_found_at, rowid"
            ),
            libsql::params![
                key.vendor_name.as_str(),
                key.product_name.as_str(),
                key.fact_category.as_str(),
                key.fact_key.as_str()
            ],
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_facts(&self, filter: &FactFilter) -> Result<Vec<VendorFact>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if !filter.include_history {
            conditions.push("superseded_by IS NULL".to_string());
        }
        if let Some(ref vendor) = filter.vendor_name {
            params.push(libsql::Value::Text(vendor.trim().to_string()));
            conditions.push(format!("vendor_name = ?{}", params.len()));
        }
        if let Some(ref product) = filter.product_name {
            params.push(libsql::Value::Text(product.trim().to_string()));
            conditions.push(format!("product_name = ?{}", params.len()));
        }
        if let Some(category) = filter.category {
            params.push(libsql::Value::Text(category.as_str().to_string()));
            conditions.push(format!("fact_category = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
            conditions.push(format!("verification_status = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(500);
        let sql = format!(
            "SELECT {FACT_COLUMNS} FROM vendor_facts {where_clause}
             ORDER BY vendor_name, product_name, fact_category, fact_key, first_found_at, rowid
             LIMIT {limit}"
        );
        query_facts(self.db().conn(), &sql, libsql::params_from_iter(params)).await
    }

    /// Live facts that need a recheck at `now`, highest `recheck_priority`
    /// first, then earliest `next_recheck_at`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_due_for_recheck(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<VendorFact>, DatabaseError> {
        let facts = query_facts(
            self.db().conn(),
            &format!(
                "SELECT {FACT_COLUMNS} FROM vendor_facts
                 WHERE superseded_by IS NULL
                   AND (verification_status IN ('disputed', 'stale')
                        OR verified_at IS NULL
                        OR expires_at IS NULL
                        OR expires_at <= ?1
                        OR next_recheck_at <= ?1)
                 ORDER BY recheck_priority DESC, next_recheck_at, first_found_at"
            ),
            [format_datetime(now)],
        )
        .await?;
        Ok(facts
            .into_iter()
            .filter(|f| f.needs_recheck_at(now))
            .take(limit)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Extraction
    // -----------------------------------------------------------------------

    /// Record an extracted fact.
    ///
    /// - no live row for the key: a new `pending` row
    /// - live row with the same value: refreshed in place (source merged)
    /// - live row with a different value: that row is disputed and replaced
    ///   by a new `pending` row linked through `superseded_by`
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an empty key or value, or
    /// `Conflict` once the retries are exhausted.
    pub async fn upsert_extracted_fact(
        &self,
        input: NewFact,
        method: VerificationMethod,
        research_log_id: Option<&str>,
    ) -> Result<UpsertOutcome, DatabaseError> {
        validate_new(&input)?;
        let input = &input;
        retry_on_conflict(self.retry_config(), move || {
            self.upsert_once(input, method, research_log_id)
        })
        .await
    }

    async fn upsert_once(
        &self,
        input: &NewFact,
        method: VerificationMethod,
        research_log_id: Option<&str>,
    ) -> Result<UpsertOutcome, DatabaseError> {
        let now = Utc::now();
        let attribution = Attribution::new(method).research_log(research_log_id);
        let key = input.key.clone();

        let _gate = self.db().write_lock().await;
        let tx = self.db().conn().transaction().await?;
        let mut logged = Vec::new();

        let outcome = match fetch_current(&tx, &key).await? {
            None => {
                let id = self.db().generate_id(PREFIX_FACT).await?;
                let mut fact = self.new_fact(id, input.clone(), now);
                fact.research_log_id = research_log_id.map(String::from);
                insert_fact(&tx, &fact).await?;
                let mut entry = draft_entry(None, &fact, VerificationAction::Created, attribution, now);
                append_note(
                    &mut entry.notes,
                    format!("extracted with confidence {:.2}", input.confidence),
                );
                logged.push((key.clone(), self.insert_log_entry(&tx, entry).await?));
                UpsertOutcome {
                    action: VerificationAction::Created,
                    fact,
                    replaced: None,
                }
            }
            Some(current) if values_match(&current.value, &input.value) => {
                let mut fact = current.clone();
                refresh_from(&mut fact, input, now);
                if research_log_id.is_some() {
                    fact.research_log_id = research_log_id.map(String::from);
                }
                fact.confidence_score = fact.calculate_confidence_at(now);
                let fact = update_fact(&tx, &fact).await?;
                let entry = draft_entry(Some(&current), &fact, VerificationAction::Refreshed, attribution, now);
                logged.push((key.clone(), self.insert_log_entry(&tx, entry).await?));
                UpsertOutcome {
                    action: VerificationAction::Refreshed,
                    fact,
                    replaced: None,
                }
            }
            Some(current) => {
                let (disputed, replacement) = self
                    .dispute_with_replacement(
                        &tx,
                        &current,
                        current.clone(),
                        input.clone(),
                        attribution,
                        now,
                        &mut logged,
                    )
                    .await?;
                UpsertOutcome {
                    action: VerificationAction::Disputed,
                    fact: replacement,
                    replaced: Some(disputed),
                }
            }
        };

        self.commit(tx, logged).await?;
        tracing::info!(
            fact_id = %outcome.fact.id,
            key = %key,
            action = %outcome.action,
            "extracted fact recorded"
        );
        Ok(outcome)
    }

    /// Dispute `current` (a modified copy of `before`) and insert a pending
    /// replacement built from `replacement_input`.
    #[allow(clippy::too_many_arguments)]
    async fn dispute_with_replacement(
        &self,
        conn: &libsql::Connection,
        before: &VendorFact,
        mut current: VendorFact,
        replacement_input: NewFact,
        attribution: Attribution<'_>,
        now: DateTime<Utc>,
        logged: &mut Logged,
    ) -> Result<(VendorFact, VendorFact), DatabaseError> {
        let replacement_id = self.db().generate_id(PREFIX_FACT).await?;
        let conflicting = replacement_input.value.clone();

        if current
            .verification_status
            .can_transition_to(VerificationStatus::Disputed)
        {
            current.set_disputed_at(now, Some(&conflicting))?;
        } else {
            current.annotate_conflict_at(now, &conflicting);
        }
        current.superseded_by = Some(replacement_id.clone());
        current.confidence_score = current.calculate_confidence_at(now);
        // The old row leaves the live-key index before the replacement enters it.
        let disputed = update_fact(conn, &current).await?;

        let mut replacement = self.new_fact(replacement_id, replacement_input, now);
        let lineage = format!("previously recorded as '{}' ({})", before.value, before.id);
        replacement.context = Some(match replacement.context.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{lineage}"),
            _ => lineage,
        });
        replacement.research_log_id = attribution.research_log_id.map(String::from);
        insert_fact(conn, &replacement).await?;

        let key = disputed.key();
        let mut entry = draft_entry(Some(before), &disputed, VerificationAction::Disputed, attribution, now);
        entry.new_value = Some(conflicting);
        append_note(&mut entry.notes, format!("replaced by {}", replacement.id));
        logged.push((key.clone(), self.insert_log_entry(conn, entry).await?));

        let mut entry = draft_entry(None, &replacement, VerificationAction::Created, attribution, now);
        append_note(&mut entry.notes, format!("replaces {}", disputed.id));
        logged.push((key.clone(), self.insert_log_entry(conn, entry).await?));

        tracing::info!(
            disputed = %disputed.id,
            replacement = %replacement.id,
            key = %key,
            "conflicting value recorded as replacement fact"
        );
        Ok((disputed, replacement))
    }

    /// Move the disputed row that `replacement` replaces to `superseded`.
    async fn retire_predecessor(
        &self,
        conn: &libsql::Connection,
        replacement: &VendorFact,
        attribution: Attribution<'_>,
        now: DateTime<Utc>,
        logged: &mut Logged,
    ) -> Result<(), DatabaseError> {
        let predecessors = query_facts(
            conn,
            &format!(
                "SELECT {FACT_COLUMNS} FROM vendor_facts
                 WHERE superseded_by = ?1 AND verification_status != 'superseded'"
            ),
            [replacement.id.as_str()],
        )
        .await?;

        for before in predecessors {
            let mut old = before.clone();
            old.mark_superseded_at(now, &replacement.id)?;
            old.confidence_score = old.calculate_confidence_at(now);
            let old = update_fact(conn, &old).await?;
            let mut entry = draft_entry(Some(&before), &old, VerificationAction::Superseded, attribution, now);
            entry.new_value = Some(replacement.value.clone());
            append_note(&mut entry.notes, format!("superseded by {}", replacement.id));
            logged.push((old.key(), self.insert_log_entry(conn, entry).await?));
            tracing::info!(fact_id = %old.id, replacement = %replacement.id, "fact superseded");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Explicit transitions
    // -----------------------------------------------------------------------

    /// Mark a live fact verified, stamping `verified_at` and `expires_at`.
    ///
    /// Verifying a replacement supersedes the disputed row it replaced.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown id, `InvalidState` for
    /// a replaced fact or an illegal transition.
    pub async fn verify_fact(
        &self,
        fact_id: &str,
        verified_by: &str,
        method: VerificationMethod,
        research_log_id: Option<&str>,
    ) -> Result<VendorFact, DatabaseError> {
        retry_on_conflict(self.retry_config(), move || {
            self.verify_once(fact_id, verified_by, method, research_log_id)
        })
        .await
    }

    async fn verify_once(
        &self,
        fact_id: &str,
        verified_by: &str,
        method: VerificationMethod,
        research_log_id: Option<&str>,
    ) -> Result<VendorFact, DatabaseError> {
        let now = Utc::now();
        let attribution = Attribution::new(method)
            .by(verified_by)
            .research_log(research_log_id);

        let _gate = self.db().write_lock().await;
        let tx = self.db().conn().transaction().await?;
        let mut logged = Vec::new();

        let before = load_live(&tx, fact_id).await?;
        let mut fact = before.clone();
        fact.set_verified_at(now, verified_by, research_log_id)?;
        fact.confidence_score = fact.calculate_confidence_at(now);
        let fact = update_fact(&tx, &fact).await?;
        let entry = draft_entry(Some(&before), &fact, VerificationAction::Verified, attribution, now);
        logged.push((fact.key(), self.insert_log_entry(&tx, entry).await?));
        self.retire_predecessor(&tx, &fact, attribution, now, &mut logged)
            .await?;

        self.commit(tx, logged).await?;
        tracing::info!(fact_id, verified_by, "fact verified");
        Ok(fact)
    }

    /// Flag a live fact as disputed.
    ///
    /// With a conflicting value, a pending replacement carrying it is created
    /// as well; without one, the fact is only flagged.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a replaced fact or an illegal
    /// transition (such as disputing an already disputed fact without a value).
    pub async fn dispute_fact(
        &self,
        fact_id: &str,
        conflicting_value: Option<&str>,
        performed_by: &str,
        notes: Option<&str>,
    ) -> Result<DisputeOutcome, DatabaseError> {
        retry_on_conflict(self.retry_config(), move || {
            self.dispute_once(fact_id, conflicting_value, performed_by, notes)
        })
        .await
    }

    async fn dispute_once(
        &self,
        fact_id: &str,
        conflicting_value: Option<&str>,
        performed_by: &str,
        notes: Option<&str>,
    ) -> Result<DisputeOutcome, DatabaseError> {
        let now = Utc::now();
        let mut attribution = Attribution::new(VerificationMethod::Manual).by(performed_by);
        attribution.notes = notes;

        let _gate = self.db().write_lock().await;
        let tx = self.db().conn().transaction().await?;
        let mut logged = Vec::new();

        let before = load_live(&tx, fact_id).await?;
        let conflict = conflicting_value
            .map(str::trim)
            .filter(|v| !v.is_empty() && !values_match(v, &before.value));

        let outcome = if let Some(value) = conflict {
            let input = replacement_for(&before, value);
            let (disputed, replacement) = self
                .dispute_with_replacement(&tx, &before, before.clone(), input, attribution, now, &mut logged)
                .await?;
            DisputeOutcome {
                disputed,
                replacement: Some(replacement),
            }
        } else {
            let mut fact = before.clone();
            fact.set_disputed_at(now, None)?;
            fact.confidence_score = fact.calculate_confidence_at(now);
            let fact = update_fact(&tx, &fact).await?;
            let entry = draft_entry(Some(&before), &fact, VerificationAction::Disputed, attribution, now);
            logged.push((fact.key(), self.insert_log_entry(&tx, entry).await?));
            DisputeOutcome {
                disputed: fact,
                replacement: None,
            }
        };

        self.commit(tx, logged).await?;
        tracing::info!(fact_id, performed_by, "fact disputed");
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a replaced fact or an illegal
    /// transition.
    pub async fn mark_stale(
        &self,
        fact_id: &str,
        performed_by: &str,
        notes: Option<&str>,
    ) -> Result<VendorFact, DatabaseError> {
        retry_on_conflict(self.retry_config(), move || {
            self.mark_stale_once(fact_id, performed_by, notes)
        })
        .await
    }

    async fn mark_stale_once(
        &self,
        fact_id: &str,
        performed_by: &str,
        notes: Option<&str>,
    ) -> Result<VendorFact, DatabaseError> {
        let now = Utc::now();
        let mut attribution = Attribution::new(VerificationMethod::Manual).by(performed_by);
        attribution.notes = notes;

        let _gate = self.db().write_lock().await;
        let tx = self.db().conn().transaction().await?;

        let before = load_live(&tx, fact_id).await?;
        let mut fact = before.clone();
        fact.mark_stale_at(now)?;
        fact.confidence_score = fact.calculate_confidence_at(now);
        let fact = update_fact(&tx, &fact).await?;
        let entry = draft_entry(Some(&before), &fact, VerificationAction::MarkedStale, attribution, now);
        let logged = vec![(fact.key(), self.insert_log_entry(&tx, entry).await?)];

        self.commit(tx, logged).await?;
        tracing::info!(fact_id, "fact marked stale");
        Ok(fact)
    }

    // -----------------------------------------------------------------------
    // Rechecks and expiry
    // -----------------------------------------------------------------------

    /// Apply the result of a lightweight source recheck.
    ///
    /// - accessible, same or no observed value: verified again
    /// - accessible, different observed value: disputed with a replacement
    /// - changed: stale
    /// - 404, blocked, timeout: value untouched; stale only if the fact was
    ///   verified and has expired. The next recheck is scheduled after the
    ///   failure-recheck delay.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a replaced fact, or when
    /// `now` is older than the row's last verification, recheck or merge.
    pub async fn apply_recheck(
        &self,
        fact_id: &str,
        outcome: &RecheckOutcome,
        now: DateTime<Utc>,
    ) -> Result<RecheckResult, DatabaseError> {
        retry_on_conflict(self.retry_config(), move || {
            self.apply_recheck_once(fact_id, outcome, now)
        })
        .await
    }

    async fn apply_recheck_once(
        &self,
        fact_id: &str,
        outcome: &RecheckOutcome,
        now: DateTime<Utc>,
    ) -> Result<RecheckResult, DatabaseError> {
        let mut attribution = Attribution::new(VerificationMethod::SourceRecheck)
            .research_log(outcome.research_log_id.as_deref());
        attribution.performed_by = outcome.performed_by.as_deref();
        attribution.http_status = outcome.http_status;
        attribution.notes = outcome.notes.as_deref();

        let _gate = self.db().write_lock().await;
        let tx = self.db().conn().transaction().await?;
        let mut logged = Vec::new();

        let before = load_live(&tx, fact_id).await?;
        let touched = last_touched(&before);
        if touched > now {
            return Err(DatabaseError::InvalidState(format!(
                "recheck observed at {now} is older than the last write to {fact_id} at {touched}"
            )));
        }
        let mut fact = before.clone();
        fact.record_recheck_at(now, outcome.status);

        let conflict = outcome
            .observed_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !values_match(v, &before.value));

        let result = match (outcome.status, conflict) {
            (SourceStatus::Accessible, Some(observed)) => {
                let input = replacement_for(&before, observed);
                let (disputed, replacement) = self
                    .dispute_with_replacement(&tx, &before, fact, input, attribution, now, &mut logged)
                    .await?;
                RecheckResult {
                    action: VerificationAction::Disputed,
                    fact: disputed,
                    replacement: Some(replacement),
                }
            }
            (SourceStatus::Accessible, None) => {
                let verified_by = outcome
                    .performed_by
                    .as_deref()
                    .unwrap_or(VerificationMethod::SourceRecheck.as_str());
                fact.set_verified_at(now, verified_by, outcome.research_log_id.as_deref())?;
                fact.confidence_score = fact.calculate_confidence_at(now);
                let fact = update_fact(&tx, &fact).await?;
                let mut entry = draft_entry(Some(&before), &fact, VerificationAction::Rechecked, attribution, now);
                append_note(&mut entry.notes, "source accessible");
                logged.push((fact.key(), self.insert_log_entry(&tx, entry).await?));
                self.retire_predecessor(&tx, &fact, attribution, now, &mut logged)
                    .await?;
                RecheckResult {
                    action: VerificationAction::Rechecked,
                    fact,
                    replacement: None,
                }
            }
            (status, _) => {
                let goes_stale = if status == SourceStatus::Changed {
                    fact.verification_status
                        .can_transition_to(VerificationStatus::Stale)
                } else {
                    fact.verification_status == VerificationStatus::Verified
                        && !fact.is_fresh_at(now)
                };
                let action = if goes_stale {
                    fact.mark_stale_at(now)?;
                    VerificationAction::MarkedStale
                } else {
                    VerificationAction::Rechecked
                };
                fact.next_recheck_at = Some(now + self.failure_recheck());
                fact.confidence_score = fact.calculate_confidence_at(now);
                let fact = update_fact(&tx, &fact).await?;
                let mut entry = draft_entry(Some(&before), &fact, action, attribution, now);
                append_note(&mut entry.notes, format!("source {status}"));
                logged.push((fact.key(), self.insert_log_entry(&tx, entry).await?));
                RecheckResult {
                    action,
                    fact,
                    replacement: None,
                }
            }
        };

        self.commit(tx, logged).await?;
        tracing::info!(
            fact_id,
            status = %outcome.status,
            action = %result.action,
            "recheck applied"
        );
        Ok(result)
    }

    /// Mark every live verified fact that has expired at `now` as stale.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the sweep cannot be written.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<VendorFact>, DatabaseError> {
        retry_on_conflict(self.retry_config(), move || self.sweep_once(now)).await
    }

    async fn sweep_once(&self, now: DateTime<Utc>) -> Result<Vec<VendorFact>, DatabaseError> {
        let attribution = Attribution::new(VerificationMethod::Manual).by("expiry_sweep");

        let _gate = self.db().write_lock().await;
        let tx = self.db().conn().transaction().await?;
        let mut logged = Vec::new();

        let expired = query_facts(
            &tx,
            &format!(
                "SELECT {FACT_COLUMNS} FROM vendor_facts
                 WHERE verification_status = 'verified' AND superseded_by IS NULL
                   AND (expires_at IS NULL OR expires_at <= ?1)
                 ORDER BY expires_at, rowid"
            ),
            [format_datetime(now)],
        )
        .await?;

        let mut swept = Vec::new();
        for before in expired.into_iter().filter(|f| !f.is_fresh_at(now)) {
            let mut fact = before.clone();
            fact.mark_stale_at(now)?;
            fact.confidence_score = fact.calculate_confidence_at(now);
            let fact = update_fact(&tx, &fact).await?;
            let mut entry = draft_entry(Some(&before), &fact, VerificationAction::MarkedStale, attribution, now);
            append_note(
                &mut entry.notes,
                before.expires_at.map_or_else(
                    || "ttl elapsed".to_string(),
                    |at| format!("expired at {}", at.to_rfc3339()),
                ),
            );
            logged.push((fact.key(), self.insert_log_entry(&tx, entry).await?));
            swept.push(fact);
        }

        self.commit(tx, logged).await?;
        tracing::info!(swept = swept.len(), "expiry sweep complete");
        Ok(swept)
    }
}
