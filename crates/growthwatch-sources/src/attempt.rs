//! Classified outcome of a single adapter invocation.

use std::time::Duration;

use growthwatch_core::{AnalysisOutput, ContactProfile, EnrichmentRecord, NewsArticle, SocialPost};

use crate::error::SourceError;

/// Whether a hard failure is worth retrying within the same tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Hard,
}

impl FailureClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureClass::Transient => "transient",
            FailureClass::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome<T> {
    Success(T),
    /// The call completed but produced nothing usable.
    SoftFailure(String),
    HardFailure {
        class: FailureClass,
        detail: String,
    },
}

/// One invocation of one tier.
#[derive(Debug, Clone)]
pub struct AcquisitionAttempt<T> {
    pub tier: &'static str,
    pub method: &'static str,
    pub outcome: AttemptOutcome<T>,
    pub latency: Duration,
}

impl<T: Payload> AcquisitionAttempt<T> {
    /// Classify a raw adapter result.
    ///
    /// | result | outcome |
    /// |---|---|
    /// | `Ok` with an empty payload | soft failure |
    /// | `Ok` | success |
    /// | `Err(NoMatch)` | soft failure |
    /// | `Err` transient | hard failure, transient |
    /// | any other `Err` | hard failure, hard |
    #[must_use]
    pub fn from_result(
        tier: &'static str,
        method: &'static str,
        result: Result<T, SourceError>,
        latency: Duration,
    ) -> Self {
        let outcome = match result {
            Ok(payload) if payload.is_empty_payload() => {
                AttemptOutcome::SoftFailure("empty response".to_owned())
            }
            Ok(payload) => AttemptOutcome::Success(payload),
            Err(SourceError::NoMatch(detail)) => AttemptOutcome::SoftFailure(detail),
            Err(err) => AttemptOutcome::HardFailure {
                class: if err.is_transient() {
                    FailureClass::Transient
                } else {
                    FailureClass::Hard
                },
                detail: err.to_string(),
            },
        };

        Self {
            tier,
            method,
            outcome,
            latency,
        }
    }
}

impl<T> AcquisitionAttempt<T> {
    /// A transient hard failure produced when the caller's deadline elapsed.
    #[must_use]
    pub fn timed_out(tier: &'static str, method: &'static str, latency: Duration) -> Self {
        Self {
            tier,
            method,
            outcome: AttemptOutcome::HardFailure {
                class: FailureClass::Transient,
                detail: format!("timed out after {}ms", latency.as_millis()),
            },
            latency,
        }
    }

    #[must_use]
    pub fn is_transient_failure(&self) -> bool {
        matches!(
            self.outcome,
            AttemptOutcome::HardFailure {
                class: FailureClass::Transient,
                ..
            }
        )
    }

    /// Short label for logs and attempt summaries.
    #[must_use]
    pub fn outcome_label(&self) -> &'static str {
        match &self.outcome {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::SoftFailure(_) => "soft_failure",
            AttemptOutcome::HardFailure { class, .. } => match class {
                FailureClass::Transient => "transient_failure",
                FailureClass::Hard => "hard_failure",
            },
        }
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match &self.outcome {
            AttemptOutcome::Success(_) => None,
            AttemptOutcome::SoftFailure(detail) | AttemptOutcome::HardFailure { detail, .. } => {
                Some(detail)
            }
        }
    }
}

/// Payloads that can be "successfully empty".
pub trait Payload {
    fn is_empty_payload(&self) -> bool;
}

impl Payload for String {
    fn is_empty_payload(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T> Payload for Vec<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for EnrichmentRecord {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for ContactProfile {
    fn is_empty_payload(&self) -> bool {
        self.name.trim().is_empty() || self.profile_url.trim().is_empty()
    }
}

impl Payload for NewsArticle {
    fn is_empty_payload(&self) -> bool {
        self.headline.trim().is_empty()
    }
}

impl Payload for SocialPost {
    fn is_empty_payload(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl Payload for AnalysisOutput {
    fn is_empty_payload(&self) -> bool {
        self.tagged_articles.is_empty()
            && self.tagged_posts.is_empty()
            && self.reachout_message.is_empty()
            && self.actions.is_empty()
    }
}
