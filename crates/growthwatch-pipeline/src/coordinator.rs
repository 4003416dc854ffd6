//! Per-company pipeline: identity, enrichment, scraping, analysis, merge.
//!
//! Only a missing identity can stop a company. Every other failure degrades
//! the report instead.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Days, NaiveDate};
use growthwatch_core::{
    AnalysisOutput, CompanyReport, CompanyTarget, ContactProfile, EnrichmentRecord, NewsArticle,
    SocialPost,
};
use growthwatch_sources::{
    AcquisitionAttempt, AnalysisInput, AttemptOutcome, CompanyPostsRequest, GrowthAnalyzer,
    NewsRequest, ProfilePostsRequest,
};
use serde::Serialize;

use crate::merge::{merge, ContactActivity};
use crate::resolver::{resolve, AttemptSummary, Resolution, Tier};
use crate::retry::TierPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStage {
    Pending,
    Enriching,
    Scraping,
    Analyzing,
    Merged,
    Done,
    Skipped,
}

impl CompanyStage {
    /// Whether `self → next` is a legal transition.
    ///
    /// ```text
    /// Pending → Enriching → Scraping → Analyzing → Merged → Done
    /// any non-terminal stage ────────────────────────────→ Skipped
    /// ```
    ///
    /// The coordinator itself only skips from `Enriching`, when identity
    /// cannot be resolved.
    #[must_use]
    pub fn can_advance_to(self, next: CompanyStage) -> bool {
        if next == CompanyStage::Skipped {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (CompanyStage::Pending, CompanyStage::Enriching)
                | (CompanyStage::Enriching, CompanyStage::Scraping)
                | (CompanyStage::Scraping, CompanyStage::Analyzing)
                | (CompanyStage::Analyzing, CompanyStage::Merged)
                | (CompanyStage::Merged, CompanyStage::Done)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, CompanyStage::Done | CompanyStage::Skipped)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CompanyStage::Pending => "pending",
            CompanyStage::Enriching => "enriching",
            CompanyStage::Scraping => "scraping",
            CompanyStage::Analyzing => "analyzing",
            CompanyStage::Merged => "merged",
            CompanyStage::Done => "done",
            CompanyStage::Skipped => "skipped",
        }
    }
}

/// Grade of a produced report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// News, company posts and analysis all produced data.
    Complete,
    Partial,
}

/// Terminal result for one company.
#[derive(Debug, Clone)]
pub enum CompanyOutcome {
    Reported {
        report: CompanyReport,
        completeness: Completeness,
        attempts: Vec<AttemptSummary>,
    },
    Skipped {
        company: String,
        reason: String,
        attempts: Vec<AttemptSummary>,
    },
}

impl CompanyOutcome {
    #[must_use]
    pub fn company(&self) -> &str {
        match self {
            CompanyOutcome::Reported { report, .. } => &report.company,
            CompanyOutcome::Skipped { company, .. } => company,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&CompanyReport> {
        match self {
            CompanyOutcome::Reported { report, .. } => Some(report),
            CompanyOutcome::Skipped { .. } => None,
        }
    }

    #[must_use]
    pub fn attempts(&self) -> &[AttemptSummary] {
        match self {
            CompanyOutcome::Reported { attempts, .. } | CompanyOutcome::Skipped { attempts, .. } => {
                attempts
            }
        }
    }
}

/// Ordered fallback lists, one per capability.
#[derive(Default)]
pub struct CapabilityTiers {
    pub identity: Vec<Tier<CompanyTarget, String>>,
    pub enrichment: Vec<Tier<str, EnrichmentRecord>>,
    pub news: Vec<Tier<NewsRequest, Vec<NewsArticle>>>,
    pub company_posts: Vec<Tier<CompanyPostsRequest, Vec<SocialPost>>>,
    pub contact: Vec<Tier<CompanyTarget, ContactProfile>>,
    pub contact_posts: Vec<Tier<ProfilePostsRequest, Vec<SocialPost>>>,
}

#[derive(Debug, Clone, Copy)]
pub struct CoordinatorSettings {
    pub policy: TierPolicy,
    pub news_recency_days: u32,
    pub posts_recency_days: u32,
}

impl CoordinatorSettings {
    #[must_use]
    pub fn from_config(config: &growthwatch_core::AppConfig) -> Self {
        Self {
            policy: TierPolicy::from_config(config),
            news_recency_days: config.news_recency_days,
            posts_recency_days: config.posts_recency_days,
        }
    }
}

pub struct CompanyCoordinator {
    tiers: CapabilityTiers,
    analyzer: Option<Arc<dyn GrowthAnalyzer>>,
    settings: CoordinatorSettings,
}

struct StageTracker<'a> {
    company: &'a str,
    stage: CompanyStage,
}

impl StageTracker<'_> {
    fn advance(&mut self, next: CompanyStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal stage transition {:?} -> {:?}",
            self.stage,
            next
        );
        tracing::debug!(
            company = self.company,
            from = self.stage.as_str(),
            to = next.as_str(),
            "stage transition"
        );
        self.stage = next;
    }
}

impl CompanyCoordinator {
    #[must_use]
    pub fn new(
        tiers: CapabilityTiers,
        analyzer: Option<Arc<dyn GrowthAnalyzer>>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            tiers,
            analyzer,
            settings,
        }
    }

    /// Run one company through every stage.
    pub async fn process(&self, target: &CompanyTarget, run_date: NaiveDate) -> CompanyOutcome {
        let policy = &self.settings.policy;
        let mut tracker = StageTracker {
            company: &target.name,
            stage: CompanyStage::Pending,
        };
        let mut attempts = Vec::new();

        tracker.advance(CompanyStage::Enriching);
        let domain = if let Some(domain) = target.domain.clone() {
            Some(domain)
        } else {
            let identity = resolve("identity", &self.tiers.identity, target, policy).await;
            attempts.extend(identity.attempts);
            identity.result.into_payload()
        };

        if domain.is_none() && target.linkedin_id.is_none() {
            tracker.advance(CompanyStage::Skipped);
            tracing::error!(
                company = %target.name,
                location = %target.location,
                "no domain or LinkedIn id could be resolved, skipping company"
            );
            return CompanyOutcome::Skipped {
                company: target.name.clone(),
                reason: "fatal-identity: no domain or LinkedIn id resolved".to_owned(),
                attempts,
            };
        }

        let enrichment = match domain.as_deref() {
            Some(domain) => {
                let resolution = resolve("enrichment", &self.tiers.enrichment, domain, policy).await;
                attempts.extend(resolution.attempts);
                resolution.result.into_payload().unwrap_or_default()
            }
            None => EnrichmentRecord::default(),
        };
        let enrichment = enrichment.or(EnrichmentRecord {
            domain,
            linkedin_id: target.linkedin_id.clone(),
            industry: None,
            hq_location: None,
        });

        tracker.advance(CompanyStage::Scraping);
        let news_request = NewsRequest::new(
            target,
            &enrichment,
            days_before(run_date, self.settings.news_recency_days),
        );
        let news = resolve("news", &self.tiers.news, &news_request, policy).await;
        attempts.extend(news.attempts);

        let posts_request = CompanyPostsRequest {
            company: target.name.clone(),
            domain: enrichment.domain.clone(),
            linkedin_id: enrichment.linkedin_id.clone(),
            since: days_before(run_date, self.settings.posts_recency_days),
            until: run_date,
        };
        let company_posts =
            resolve("company_posts", &self.tiers.company_posts, &posts_request, policy).await;
        attempts.extend(company_posts.attempts);

        let contact = resolve("contact", &self.tiers.contact, target, policy).await;
        attempts.extend(contact.attempts);
        let profile = contact.result.into_payload();

        let contact_posts = match &profile {
            Some(profile) => {
                let request = ProfilePostsRequest {
                    profile: profile.clone(),
                    since: days_before(run_date, self.settings.posts_recency_days),
                    until: run_date,
                };
                resolve("contact_posts", &self.tiers.contact_posts, &request, policy).await
            }
            None => Resolution::not_attempted(),
        };
        attempts.extend(contact_posts.attempts);

        let news_found = news.result.is_found();
        let posts_found = company_posts.result.is_found();
        let articles = news.result.into_payload().unwrap_or_default();
        let posts = company_posts.result.into_payload().unwrap_or_default();

        tracker.advance(CompanyStage::Analyzing);
        let input = AnalysisInput {
            company: target.name.clone(),
            articles,
            posts,
        };
        let (analysis, analysis_ok) = match self.run_analysis(&input).await {
            Some(attempt) => {
                attempts.push(AttemptSummary::from_attempt("analysis", &attempt, 1));
                match attempt.outcome {
                    AttemptOutcome::Success(output) => (output, true),
                    _ => (AnalysisOutput::placeholder(), false),
                }
            }
            None => (AnalysisOutput::placeholder(), false),
        };

        let report = merge(
            target,
            &enrichment,
            &input.articles,
            &input.posts,
            &ContactActivity {
                profile,
                posts: contact_posts.result.into_payload().unwrap_or_default(),
            },
            &analysis,
            run_date,
        );
        tracker.advance(CompanyStage::Merged);

        let completeness = if news_found && posts_found && analysis_ok {
            Completeness::Complete
        } else {
            Completeness::Partial
        };

        tracker.advance(CompanyStage::Done);
        tracing::info!(
            company = %target.name,
            completeness = ?completeness,
            articles = report.articles.len(),
            posts = report.posts.len(),
            contact = report.contact_name.is_some(),
            "company processed"
        );

        CompanyOutcome::Reported {
            report,
            completeness,
            attempts,
        }
    }

    async fn run_analysis(&self, input: &AnalysisInput) -> Option<AcquisitionAttempt<AnalysisOutput>> {
        let analyzer = self.analyzer.as_ref()?;
        let started = Instant::now();
        let timeout = self.settings.policy.tier_timeout;

        let attempt = match tokio::time::timeout(timeout, analyzer.analyze(input)).await {
            Ok(result) => AcquisitionAttempt::from_result(
                analyzer.name(),
                "growth analysis",
                result,
                started.elapsed(),
            ),
            Err(_elapsed) => {
                AcquisitionAttempt::timed_out(analyzer.name(), "growth analysis", started.elapsed())
            }
        };

        if !matches!(attempt.outcome, AttemptOutcome::Success(_)) {
            tracing::warn!(
                company = %input.company,
                tier = attempt.tier,
                outcome = attempt.outcome_label(),
                error = attempt.detail().unwrap_or_default(),
                "analysis failed, using placeholder"
            );
        }
        Some(attempt)
    }
}

fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(date)
}
