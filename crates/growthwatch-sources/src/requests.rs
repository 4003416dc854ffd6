//! Request types for capabilities that need more than a single key.

use chrono::NaiveDate;
use growthwatch_core::{CompanyTarget, ContactProfile, EnrichmentRecord};

#[derive(Debug, Clone)]
pub struct NewsRequest {
    pub company: String,
    pub location: String,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub hq_location: Option<String>,
    /// Only articles published after this date are wanted.
    pub published_after: NaiveDate,
}

impl NewsRequest {
    #[must_use]
    pub fn new(
        target: &CompanyTarget,
        enrichment: &EnrichmentRecord,
        published_after: NaiveDate,
    ) -> Self {
        Self {
            company: target.name.clone(),
            location: target.location.clone(),
            domain: enrichment.domain.clone(),
            industry: enrichment.industry.clone(),
            hq_location: enrichment.hq_location.clone(),
            published_after,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompanyPostsRequest {
    pub company: String,
    pub domain: Option<String>,
    pub linkedin_id: Option<String>,
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl CompanyPostsRequest {
    /// `https://www.linkedin.com/company/{id}` when the id is known.
    #[must_use]
    pub fn company_url(&self) -> Option<String> {
        self.linkedin_id
            .as_deref()
            .map(|id| format!("https://www.linkedin.com/company/{id}"))
    }
}

#[derive(Debug, Clone)]
pub struct ProfilePostsRequest {
    pub profile: ContactProfile,
    pub since: NaiveDate,
    pub until: NaiveDate,
}
