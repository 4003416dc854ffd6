//! Report sinks: JSON records on disk and the CRM push.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;
use growthwatch_core::CompanyReport;
use growthwatch_sources::{SalesforceClient, SourceError};

use crate::error::DeliveryError;
use crate::orchestrator::BatchRunOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliverySummary {
    pub delivered: usize,
    pub failed: usize,
}

/// Destination for the reports of a finished batch.
///
/// Per-report failures are counted in the summary. An `Err` means the sink
/// could not be used at all.
pub trait ReportSink: Send + Sync {
    fn name(&self) -> &'static str;

    fn deliver<'a>(
        &'a self,
        outcome: &'a BatchRunOutcome,
    ) -> BoxFuture<'a, Result<DeliverySummary, DeliveryError>>;
}

/// Writes one pretty-printed JSON file per report.
///
/// Stems are compared case-insensitively within a batch. A report whose stem
/// was already written is counted as failed and never overwrites the earlier
/// record.
#[derive(Debug, Clone)]
pub struct JsonRecordSink {
    output_dir: PathBuf,
}

impl JsonRecordSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn path_for(&self, company: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.json", sanitize_file_name(company)))
    }

    async fn write_report(&self, report: &CompanyReport) -> Result<PathBuf, DeliveryError> {
        let path = self.path_for(&report.company);
        let mut body = serde_json::to_vec_pretty(report)?;
        body.push(b'\n');
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| DeliveryError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

impl ReportSink for JsonRecordSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn deliver<'a>(
        &'a self,
        outcome: &'a BatchRunOutcome,
    ) -> BoxFuture<'a, Result<DeliverySummary, DeliveryError>> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&self.output_dir)
                .await
                .map_err(|source| DeliveryError::Io {
                    path: self.output_dir.clone(),
                    source,
                })?;

            let mut summary = DeliverySummary::default();
            let mut stems = HashSet::new();
            for report in outcome.reports() {
                let stem = sanitize_file_name(&report.company).to_lowercase();
                if !stems.insert(stem) {
                    summary.failed += 1;
                    tracing::error!(
                        company = %report.company,
                        path = %self.path_for(&report.company).display(),
                        "record path already used by another company in this batch"
                    );
                    continue;
                }
                match self.write_report(report).await {
                    Ok(path) => {
                        summary.delivered += 1;
                        tracing::debug!(company = %report.company, path = %path.display(), "record written");
                    }
                    Err(e) => {
                        summary.failed += 1;
                        tracing::error!(company = %report.company, error = %e, "failed to write record");
                    }
                }
            }
            Ok(summary)
        })
    }
}

/// Pushes each report onto the matching CRM account.
pub struct CrmSink {
    client: Arc<SalesforceClient>,
}

impl CrmSink {
    #[must_use]
    pub fn new(client: Arc<SalesforceClient>) -> Self {
        Self { client }
    }
}

impl ReportSink for CrmSink {
    fn name(&self) -> &'static str {
        "salesforce"
    }

    fn deliver<'a>(
        &'a self,
        outcome: &'a BatchRunOutcome,
    ) -> BoxFuture<'a, Result<DeliverySummary, DeliveryError>> {
        Box::pin(async move {
            let mut summary = DeliverySummary::default();
            for report in outcome.reports() {
                match self.client.push_report(report).await {
                    Ok(()) => {
                        summary.delivered += 1;
                        tracing::info!(company = %report.company, "CRM account updated");
                    }
                    // Rejected credentials abort the remaining pushes.
                    Err(e @ SourceError::Unauthorized { .. }) => return Err(e.into()),
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(company = %report.company, error = %e, "CRM push failed");
                    }
                }
            }
            Ok(summary)
        })
    }
}

/// File-system safe stem for a company name.
#[must_use]
pub fn sanitize_file_name(company: &str) -> String {
    let cleaned: String = company
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if cleaned.is_empty() {
        "company".to_owned()
    } else {
        cleaned.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_path_characters() {
        assert_eq!(sanitize_file_name("OnQ Software"), "OnQ Software");
        assert_eq!(sanitize_file_name("A/B: C?"), "A_B_ C_");
        assert_eq!(sanitize_file_name("  ..  "), "company");
        assert_eq!(sanitize_file_name("..hidden"), "hidden");
    }
}
