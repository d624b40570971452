//! HTTP source checker.
//!
//! Revalidates a cached fact with a plain GET on its `source_url`. The body is
//! only read when the fact carries a snippet to look for.

use async_trait::async_trait;
use vf_config::HttpConfig;
use vf_core::entities::VendorFact;
use vf_core::enums::SourceStatus;
use vf_db::updates::recheck::{RecheckOutcome, RecheckOutcomeBuilder};
use vf_research::SourceChecker;

const PERFORMED_BY: &str = "http_checker";

pub struct HttpSourceChecker {
    http: reqwest::Client,
}

impl HttpSourceChecker {
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { http })
    }
}

/// Source status for an HTTP response code.
fn status_for(code: u16) -> SourceStatus {
    match code {
        200..=299 => SourceStatus::Accessible,
        404 | 410 => SourceStatus::NotFound,
        _ => SourceStatus::Blocked,
    }
}

/// Case and whitespace insensitive containment.
fn snippet_present(body: &str, snippet: &str) -> bool {
    let squash = |text: &str| {
        text.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    };
    squash(body).contains(&squash(snippet))
}

#[async_trait]
impl SourceChecker for HttpSourceChecker {
    async fn check(&self, fact: &VendorFact) -> RecheckOutcome {
        let Some(url) = fact.source_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return RecheckOutcomeBuilder::new(SourceStatus::Blocked)
                .notes("no source url")
                .performed_by(PERFORMED_BY)
                .build();
        };

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::debug!(fact_id = %fact.id, url, "source check timed out");
                return RecheckOutcomeBuilder::new(SourceStatus::Timeout)
                    .notes(e.to_string())
                    .performed_by(PERFORMED_BY)
                    .build();
            }
            Err(e) => {
                tracing::debug!(fact_id = %fact.id, url, %e, "source check failed");
                return RecheckOutcomeBuilder::new(SourceStatus::Blocked)
                    .notes(e.to_string())
                    .performed_by(PERFORMED_BY)
                    .build();
            }
        };

        let code = response.status().as_u16();
        let mut status = status_for(code);
        let mut notes = None;
        if status == SourceStatus::Blocked && !matches!(code, 401 | 403 | 429) {
            notes = Some(format!("unexpected http status {code}"));
        }

        let snippet = fact
            .source_snippet
            .as_deref()
            .filter(|s| !s.trim().is_empty());
        if let (SourceStatus::Accessible, Some(snippet)) = (status, snippet) {
            match response.text().await {
                Ok(body) if !snippet_present(&body, snippet) => {
                    status = SourceStatus::Changed;
                    notes = Some("stored snippet not found on page".into());
                }
                Ok(_) => {}
                Err(e) if e.is_timeout() => {
                    status = SourceStatus::Timeout;
                    notes = Some(e.to_string());
                }
                Err(e) => notes = Some(format!("body unreadable: {e}")),
            }
        }

        tracing::debug!(fact_id = %fact.id, url, code, %status, "source checked");
        let builder = RecheckOutcomeBuilder::new(status)
            .http_status(code)
            .performed_by(PERFORMED_BY);
        match notes {
            Some(notes) => builder.notes(notes).build(),
            None => builder.build(),
        }
    }
}
