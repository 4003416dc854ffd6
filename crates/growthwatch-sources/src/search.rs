//! Web-search adapters: company identity (website domain) and contact discovery.

use futures::future::BoxFuture;
use growthwatch_core::{CompanyTarget, ContactProfile};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::error::SourceError;
use crate::http::{check_status, read_json, trim_base_url};

const SERPAPI_BASE_URL: &str = "https://serpapi.com";
const GOOGLE_CSE_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    link: Option<String>,
}

/// Reduce a URL to its bare host: scheme and `www.` stripped, lowercased.
///
/// Returns `None` when no host can be extracted.
#[must_use]
pub fn clean_domain(link: &str) -> Option<String> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&with_scheme).ok()?;
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_owned();
    (!host.is_empty()).then_some(host)
}

/// Person name from a LinkedIn search-result title such as
/// `"Jane Citizen - Founder - OnQ Software | LinkedIn"`.
#[must_use]
pub fn contact_name_from_title(title: &str) -> Option<String> {
    let cut = [" - ", " – ", " | "]
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .unwrap_or(title.len());
    let name = title[..cut].trim();
    (!name.is_empty()).then(|| name.to_owned())
}

/// SerpApi Google search, Australian locale.
///
/// Serves two tiers: `serpapi` (company domain) and `serpapi_contact`
/// (founder/executive LinkedIn profile).
#[derive(Clone)]
pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    #[must_use]
    pub fn new(client: Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
            base_url: SERPAPI_BASE_URL.to_owned(),
        }
    }

    /// Point the client at a different host (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    async fn search(&self, query: &str) -> Result<Vec<OrganicResult>, SourceError> {
        let url = format!("{}/search.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("engine", "google"),
                ("location", "Australia"),
                ("google_domain", "google.com.au"),
                ("hl", "en"),
                ("gl", "au"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let response = check_status("serpapi", response)?;
        let body: SerpApiResponse = read_json(response, "serpapi search").await?;

        if let Some(error) = body.error {
            if error.to_lowercase().contains("hasn't returned any results") {
                return Err(SourceError::NoMatch(format!("no results for '{query}'")));
            }
            return Err(SourceError::Api(error));
        }

        Ok(body.organic_results)
    }

    async fn find_domain(&self, target: &CompanyTarget) -> Result<String, SourceError> {
        let query = format!("{} {}", target.name, target.location);
        let results = self.search(&query).await?;

        let link = results
            .into_iter()
            .next()
            .and_then(|r| r.link)
            .ok_or_else(|| SourceError::NoMatch(format!("no organic result for '{query}'")))?;

        let domain = clean_domain(&link)
            .ok_or_else(|| SourceError::NoMatch(format!("unusable result link '{link}'")))?;
        tracing::debug!(company = %target.name, domain = %domain, "serpapi resolved domain");
        Ok(domain)
    }

    async fn find_contact(&self, target: &CompanyTarget) -> Result<ContactProfile, SourceError> {
        let query = format!(
            "site:linkedin.com/in \"{}\" (founder OR CEO OR \"managing director\")",
            target.name
        );
        let results = self.search(&query).await?;

        results
            .into_iter()
            .filter_map(|r| {
                let link = r.link?;
                if !link.contains("linkedin.com/in/") {
                    return None;
                }
                let name = contact_name_from_title(r.title.as_deref()?)?;
                Some(ContactProfile {
                    name,
                    profile_url: link,
                })
            })
            .next()
            .ok_or_else(|| {
                SourceError::NoMatch(format!("no LinkedIn profile found for '{}'", target.name))
            })
    }
}

impl SourceAdapter<CompanyTarget, String> for SerpApiClient {
    fn tier_id(&self) -> &'static str {
        "serpapi"
    }

    fn method(&self) -> &'static str {
        "serpapi google search"
    }

    fn fetch<'a>(&'a self, req: &'a CompanyTarget) -> BoxFuture<'a, Result<String, SourceError>> {
        Box::pin(self.find_domain(req))
    }
}

impl SourceAdapter<CompanyTarget, ContactProfile> for SerpApiClient {
    fn tier_id(&self) -> &'static str {
        "serpapi_contact"
    }

    fn method(&self) -> &'static str {
        "serpapi linkedin profile search"
    }

    fn fetch<'a>(
        &'a self,
        req: &'a CompanyTarget,
    ) -> BoxFuture<'a, Result<ContactProfile, SourceError>> {
        Box::pin(self.find_contact(req))
    }
}

/// Google Programmable Search (Custom Search JSON API).
#[derive(Clone)]
pub struct GoogleCseClient {
    client: Client,
    api_key: String,
    cx: String,
    base_url: String,
}

impl GoogleCseClient {
    #[must_use]
    pub fn new(client: Client, api_key: &str, cx: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
            cx: cx.to_owned(),
            base_url: GOOGLE_CSE_BASE_URL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    async fn find_domain(&self, target: &CompanyTarget) -> Result<String, SourceError> {
        let query = format!("{} {} official site", target.name, target.location);
        let url = format!("{}/customsearch/v1", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cx.as_str()),
                ("q", query.as_str()),
                ("num", "1"),
            ])
            .send()
            .await?;
        let response = check_status("google_cse", response)?;
        let body: CseResponse = read_json(response, "google custom search").await?;

        let link = body
            .items
            .into_iter()
            .next()
            .and_then(|i| i.link)
            .ok_or_else(|| SourceError::NoMatch(format!("no items for '{query}'")))?;

        clean_domain(&link)
            .ok_or_else(|| SourceError::NoMatch(format!("unusable result link '{link}'")))
    }
}

impl SourceAdapter<CompanyTarget, String> for GoogleCseClient {
    fn tier_id(&self) -> &'static str {
        "google_cse"
    }

    fn method(&self) -> &'static str {
        "google custom search"
    }

    fn fetch<'a>(&'a self, req: &'a CompanyTarget) -> BoxFuture<'a, Result<String, SourceError>> {
        Box::pin(self.find_domain(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_domain_strips_scheme_and_www() {
        assert_eq!(
            clean_domain("https://www.LabGroup.com.au/about?x=1").as_deref(),
            Some("labgroup.com.au")
        );
        assert_eq!(clean_domain("onq.com").as_deref(), Some("onq.com"));
        assert_eq!(
            clean_domain("http://axcelerate.com.au:8080/").as_deref(),
            Some("axcelerate.com.au")
        );
        assert_eq!(clean_domain("   "), None);
    }

    #[test]
    fn contact_name_takes_text_before_separator() {
        assert_eq!(
            contact_name_from_title("Jane Citizen - Founder - OnQ Software | LinkedIn").as_deref(),
            Some("Jane Citizen")
        );
        assert_eq!(
            contact_name_from_title("Sam Lee | LinkedIn").as_deref(),
            Some("Sam Lee")
        );
        assert_eq!(contact_name_from_title(" - CEO").as_deref(), None);
    }
}
