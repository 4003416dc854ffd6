//! Ordered multi-tier fallback for one capability.

use std::sync::Arc;
use std::time::Instant;

use growthwatch_sources::{AcquisitionAttempt, AttemptOutcome, Payload, SourceAdapter};
use serde::Serialize;

use crate::retry::{retry_transient, TierPolicy};

/// One entry in a capability's fallback list.
pub struct Tier<Req: ?Sized, T> {
    pub id: &'static str,
    pub enabled: bool,
    adapter: Arc<dyn SourceAdapter<Req, T>>,
}

impl<Req, T> Tier<Req, T>
where
    Req: Sync + ?Sized,
    T: Payload + Send + 'static,
{
    pub fn new(adapter: Arc<dyn SourceAdapter<Req, T>>, enabled: bool) -> Self {
        Self {
            id: adapter.tier_id(),
            enabled,
            adapter,
        }
    }

    pub fn enabled(adapter: Arc<dyn SourceAdapter<Req, T>>) -> Self {
        Self::new(adapter, true)
    }
}

impl<Req: ?Sized, T> std::fmt::Debug for Tier<Req, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tier")
            .field("id", &self.id)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Final result of resolving one capability.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionResult<T> {
    Found { tier: &'static str, payload: T },
    /// Every enabled tier was tried and none produced data.
    NoData,
    /// No enabled tier, or a precondition for the capability was absent.
    NotAttempted,
}

impl<T> AcquisitionResult<T> {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, AcquisitionResult::Found { .. })
    }

    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        match self {
            AcquisitionResult::Found { payload, .. } => Some(payload),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_payload(self) -> Option<T> {
        match self {
            AcquisitionResult::Found { payload, .. } => Some(payload),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AcquisitionResult::Found { .. } => "found",
            AcquisitionResult::NoData => "no_data",
            AcquisitionResult::NotAttempted => "not_attempted",
        }
    }
}

/// Payload-free record of one attempt, kept for run diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptSummary {
    pub capability: &'static str,
    pub tier: &'static str,
    pub method: &'static str,
    pub outcome: &'static str,
    pub detail: Option<String>,
    pub latency_ms: u64,
    /// 1 for the first call to a tier, 2 for its first retry.
    pub attempt: u32,
}

impl AttemptSummary {
    pub fn from_attempt<T>(
        capability: &'static str,
        attempt: &AcquisitionAttempt<T>,
        number: u32,
    ) -> Self {
        Self {
            capability,
            tier: attempt.tier,
            method: attempt.method,
            outcome: attempt.outcome_label(),
            detail: attempt.detail().map(ToOwned::to_owned),
            latency_ms: u64::try_from(attempt.latency.as_millis()).unwrap_or(u64::MAX),
            attempt: number,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolution<T> {
    pub result: AcquisitionResult<T>,
    pub attempts: Vec<AttemptSummary>,
}

impl<T> Resolution<T> {
    #[must_use]
    pub fn not_attempted() -> Self {
        Self {
            result: AcquisitionResult::NotAttempted,
            attempts: Vec::new(),
        }
    }
}

/// Try `tiers` in order until one succeeds.
///
/// Disabled tiers are skipped. Each call is bounded by `policy.tier_timeout`;
/// an elapsed timeout counts as a transient failure and is retried like any
/// other. Never fails: exhaustion yields [`AcquisitionResult::NoData`], an
/// empty or fully disabled list yields [`AcquisitionResult::NotAttempted`].
pub async fn resolve<Req, T>(
    capability: &'static str,
    tiers: &[Tier<Req, T>],
    request: &Req,
    policy: &TierPolicy,
) -> Resolution<T>
where
    Req: Sync + ?Sized,
    T: Payload + Send + 'static,
{
    let mut attempts = Vec::new();
    let mut tried_any = false;

    for tier in tiers.iter().filter(|tier| tier.enabled) {
        tried_any = true;
        let history = retry_transient(policy, || timed_call(tier, request, policy)).await;

        let mut final_attempt = None;
        for (index, attempt) in history.into_iter().enumerate() {
            let number = u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1);
            let summary = AttemptSummary::from_attempt(capability, &attempt, number);
            log_attempt(&summary);
            attempts.push(summary);
            final_attempt = Some(attempt);
        }

        if let Some(AcquisitionAttempt {
            tier: tier_id,
            outcome: AttemptOutcome::Success(payload),
            ..
        }) = final_attempt
        {
            tracing::debug!(capability, tier = tier_id, "capability resolved");
            return Resolution {
                result: AcquisitionResult::Found {
                    tier: tier_id,
                    payload,
                },
                attempts,
            };
        }
    }

    let result = if tried_any {
        tracing::warn!(capability, "all tiers exhausted without data");
        AcquisitionResult::NoData
    } else {
        tracing::debug!(capability, "no enabled tier");
        AcquisitionResult::NotAttempted
    };
    Resolution { result, attempts }
}

async fn timed_call<Req, T>(
    tier: &Tier<Req, T>,
    request: &Req,
    policy: &TierPolicy,
) -> AcquisitionAttempt<T>
where
    Req: Sync + ?Sized,
    T: Payload + Send + 'static,
{
    let started = Instant::now();
    match tokio::time::timeout(policy.tier_timeout, tier.adapter.call(request)).await {
        Ok(attempt) => attempt,
        Err(_elapsed) => {
            AcquisitionAttempt::timed_out(tier.id, tier.adapter.method(), started.elapsed())
        }
    }
}

fn log_attempt(summary: &AttemptSummary) {
    match summary.outcome {
        "success" => tracing::debug!(
            capability = summary.capability,
            tier = summary.tier,
            method = summary.method,
            latency_ms = summary.latency_ms,
            "tier succeeded"
        ),
        "soft_failure" => tracing::info!(
            capability = summary.capability,
            tier = summary.tier,
            method = summary.method,
            latency_ms = summary.latency_ms,
            error = summary.detail.as_deref().unwrap_or_default(),
            "tier returned no data"
        ),
        _ => tracing::warn!(
            capability = summary.capability,
            tier = summary.tier,
            method = summary.method,
            latency_ms = summary.latency_ms,
            outcome = summary.outcome,
            error = summary.detail.as_deref().unwrap_or_default(),
            "tier failed"
        ),
    }
}
