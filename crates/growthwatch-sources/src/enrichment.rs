//! Firmable company-data enrichment.

use futures::future::BoxFuture;
use growthwatch_core::EnrichmentRecord;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::error::SourceError;
use crate::http::{check_status, read_json, trim_base_url};
use crate::search::clean_domain;

const FIRMABLE_BASE_URL: &str = "https://api.firmable.com";

#[derive(Debug, Deserialize)]
struct FirmableCompany {
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    linkedin: Option<String>,
    #[serde(default)]
    industries: Vec<String>,
    #[serde(default)]
    hq_location: Option<String>,
}

/// Which form of the domain a lookup sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainVariant {
    /// The domain as resolved.
    AsGiven,
    /// The Australian `.com.au` form of the domain.
    ComAu,
}

/// `x.com` → `x.com.au`, `x` → `x.com.au`; `None` when already `.au`.
#[must_use]
pub fn com_au_variant(domain: &str) -> Option<String> {
    let base = domain.trim().trim_end_matches('/');
    if base.is_empty() || base.ends_with(".au") {
        return None;
    }
    Some(match base.strip_suffix(".com") {
        Some(stem) => format!("{stem}.com.au"),
        None => format!("{base}.com.au"),
    })
}

/// Extract the company slug from a LinkedIn company URL, or pass a bare slug
/// through.
#[must_use]
pub fn linkedin_slug(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let slug = match trimmed.find("linkedin.com/company/") {
        Some(idx) => {
            let rest = &trimmed[idx + "linkedin.com/company/".len()..];
            rest.split(['/', '?', '#']).next().unwrap_or_default()
        }
        None if trimmed.contains('/') => return None,
        None => trimmed,
    };
    (!slug.is_empty()).then(|| slug.to_owned())
}

#[derive(Clone)]
pub struct FirmableClient {
    client: Client,
    api_key: String,
    base_url: String,
    variant: DomainVariant,
}

impl FirmableClient {
    #[must_use]
    pub fn new(client: Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
            base_url: FIRMABLE_BASE_URL.to_owned(),
            variant: DomainVariant::AsGiven,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    /// A copy of this client that looks up the `.com.au` variant.
    #[must_use]
    pub fn com_au(&self) -> Self {
        Self {
            variant: DomainVariant::ComAu,
            ..self.clone()
        }
    }

    async fn lookup(&self, domain: &str) -> Result<EnrichmentRecord, SourceError> {
        let website = match self.variant {
            DomainVariant::AsGiven => domain.trim().to_owned(),
            DomainVariant::ComAu => com_au_variant(domain).ok_or_else(|| {
                SourceError::NoMatch(format!("'{domain}' is already an .au domain"))
            })?,
        };
        if website.is_empty() {
            return Err(SourceError::NoMatch("no domain to look up".to_owned()));
        }

        let url = format!("{}/company", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("website", website.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::NoMatch(format!(
                "firmable has no company for '{website}'"
            )));
        }
        let response = check_status("firmable", response)?;
        let company: FirmableCompany = read_json(response, "firmable company").await?;

        let record = EnrichmentRecord {
            domain: company
                .website
                .as_deref()
                .and_then(clean_domain)
                .or_else(|| clean_domain(&website)),
            linkedin_id: company.linkedin.as_deref().and_then(linkedin_slug),
            industry: company
                .industries
                .into_iter()
                .map(|i| i.trim().to_owned())
                .find(|i| !i.is_empty()),
            hq_location: company
                .hq_location
                .map(|l| l.trim().to_owned())
                .filter(|l| !l.is_empty()),
        };

        tracing::debug!(
            website = %website,
            linkedin_id = ?record.linkedin_id,
            industry = ?record.industry,
            "firmable lookup complete"
        );
        Ok(record)
    }
}

impl SourceAdapter<str, EnrichmentRecord> for FirmableClient {
    fn tier_id(&self) -> &'static str {
        match self.variant {
            DomainVariant::AsGiven => "firmable",
            DomainVariant::ComAu => "firmable_au",
        }
    }

    fn method(&self) -> &'static str {
        match self.variant {
            DomainVariant::AsGiven => "firmable company lookup",
            DomainVariant::ComAu => "firmable company lookup (.com.au)",
        }
    }

    fn fetch<'a>(&'a self, req: &'a str) -> BoxFuture<'a, Result<EnrichmentRecord, SourceError>> {
        Box::pin(self.lookup(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn com_au_variant_rules() {
        assert_eq!(com_au_variant("onq.com").as_deref(), Some("onq.com.au"));
        assert_eq!(com_au_variant("partmax").as_deref(), Some("partmax.com.au"));
        assert_eq!(com_au_variant("labgroup.com.au"), None);
        assert_eq!(com_au_variant("example.net.au"), None);
        assert_eq!(com_au_variant(""), None);
    }

    #[test]
    fn linkedin_slug_accepts_urls_and_bare_slugs() {
        assert_eq!(
            linkedin_slug("https://www.linkedin.com/company/grc-solutions-pty-ltd/").as_deref(),
            Some("grc-solutions-pty-ltd")
        );
        assert_eq!(
            linkedin_slug("linkedin.com/company/onq-software?trk=x").as_deref(),
            Some("onq-software")
        );
        assert_eq!(linkedin_slug("onq-software").as_deref(), Some("onq-software"));
        assert_eq!(linkedin_slug("https://example.com/about"), None);
        assert_eq!(linkedin_slug(""), None);
    }

    #[test]
    fn tier_ids_follow_variant() {
        let client = FirmableClient::new(Client::new(), "key");
        assert_eq!(SourceAdapter::<str, EnrichmentRecord>::tier_id(&client), "firmable");
        assert_eq!(
            SourceAdapter::<str, EnrichmentRecord>::tier_id(&client.com_au()),
            "firmable_au"
        );
    }
}
