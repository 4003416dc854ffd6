//! Sequential batch loop over all configured companies.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use growthwatch_core::{CompanyReport, CompanyTarget};
use uuid::Uuid;

use crate::coordinator::{CompanyCoordinator, CompanyOutcome, Completeness};

/// Aggregate result of one batch run.
#[derive(Debug, Clone)]
pub struct BatchRunOutcome {
    pub run_id: Uuid,
    pub run_date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One entry per company, in input order.
    pub entries: Vec<CompanyOutcome>,
    pub succeeded: usize,
    pub partial: usize,
    pub skipped: usize,
}

impl BatchRunOutcome {
    /// A run fails only when it had companies and skipped every one of them.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.entries.is_empty() || self.skipped < self.entries.len()
    }

    pub fn reports(&self) -> impl Iterator<Item = &CompanyReport> {
        self.entries.iter().filter_map(CompanyOutcome::report)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

pub struct BatchOrchestrator {
    coordinator: CompanyCoordinator,
    pacing: Duration,
}

impl BatchOrchestrator {
    #[must_use]
    pub fn new(coordinator: CompanyCoordinator, pacing: Duration) -> Self {
        Self {
            coordinator,
            pacing,
        }
    }

    /// Process `companies` for today's date.
    pub async fn run(&self, companies: &[CompanyTarget]) -> BatchRunOutcome {
        self.run_on(companies, Utc::now().date_naive()).await
    }

    /// Process `companies` in order, waiting the pacing delay between
    /// consecutive companies but not after the last one.
    pub async fn run_on(&self, companies: &[CompanyTarget], run_date: NaiveDate) -> BatchRunOutcome {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(
            %run_id,
            companies = companies.len(),
            %run_date,
            pacing_secs = self.pacing.as_secs(),
            "batch run started"
        );

        let mut entries = Vec::with_capacity(companies.len());
        let (mut succeeded, mut partial, mut skipped) = (0usize, 0usize, 0usize);

        for (index, target) in companies.iter().enumerate() {
            tracing::info!(
                company = %target.name,
                position = index + 1,
                of = companies.len(),
                "processing company"
            );

            let outcome = self.coordinator.process(target, run_date).await;
            match &outcome {
                CompanyOutcome::Reported {
                    completeness: Completeness::Complete,
                    ..
                } => succeeded += 1,
                CompanyOutcome::Reported { .. } => partial += 1,
                CompanyOutcome::Skipped { reason, .. } => {
                    skipped += 1;
                    tracing::error!(company = %target.name, reason = %reason, "company skipped");
                }
            }
            entries.push(outcome);

            let is_last = index + 1 == companies.len();
            if !is_last && !self.pacing.is_zero() {
                tracing::debug!(delay_secs = self.pacing.as_secs(), "pacing before next company");
                tokio::time::sleep(self.pacing).await;
            }
        }

        let finished_at = Utc::now();
        tracing::info!(
            %run_id,
            succeeded,
            partial,
            skipped,
            elapsed_secs = (finished_at - started_at).num_seconds(),
            "batch run finished"
        );

        BatchRunOutcome {
            run_id,
            run_date,
            started_at,
            finished_at,
            entries,
            succeeded,
            partial,
            skipped,
        }
    }
}

/// Restrict `companies` to the one named `name`, matched case-insensitively.
///
/// Returns an empty list when nothing matches.
#[must_use]
pub fn select_companies(companies: &[CompanyTarget], name: Option<&str>) -> Vec<CompanyTarget> {
    match name {
        None => companies.to_vec(),
        Some(name) => {
            let wanted = name.trim().to_lowercase();
            companies
                .iter()
                .filter(|c| c.name.trim().to_lowercase() == wanted)
                .cloned()
                .collect()
        }
    }
}
