//! External browser-automation worker.
//!
//! The worker owns the logged-in browser session and page scrolling; this
//! client only speaks its HTTP contract:
//!
//! - `POST /linkedin/company-posts` `{company_url, company_name, domain, since}`
//! - `POST /linkedin/profile-posts` `{profile_url, since}`
//!
//! Both answer `{"posts": [{"date": "2w", "likes": "14", "text": "..."}]}`.

use futures::future::BoxFuture;
use growthwatch_core::SocialPost;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::adapter::SourceAdapter;
use crate::error::SourceError;
use crate::http::{check_status, read_json, trim_base_url};
use crate::requests::{CompanyPostsRequest, ProfilePostsRequest};

#[derive(Debug, Deserialize)]
struct WorkerResponse {
    #[serde(default)]
    posts: Vec<WorkerPost>,
}

#[derive(Debug, Deserialize)]
struct WorkerPost {
    #[serde(default)]
    date: String,
    #[serde(default)]
    text: String,
}

#[derive(Clone)]
pub struct BrowserWorkerClient {
    client: Client,
    base_url: String,
}

impl BrowserWorkerClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
        }
    }

    async fn post_for_posts(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<Vec<SocialPost>, SourceError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_status("browser_worker", response)?;
        let payload: WorkerResponse = read_json(response, path).await?;

        Ok(payload
            .posts
            .into_iter()
            .filter(|p| !p.text.trim().is_empty())
            .map(|p| SocialPost {
                text: p.text.trim().to_owned(),
                timestamp: p.date.trim().to_owned(),
            })
            .collect())
    }
}

impl SourceAdapter<CompanyPostsRequest, Vec<SocialPost>> for BrowserWorkerClient {
    fn tier_id(&self) -> &'static str {
        "browser_worker"
    }

    fn method(&self) -> &'static str {
        "browser worker company page scrape"
    }

    fn fetch<'a>(
        &'a self,
        req: &'a CompanyPostsRequest,
    ) -> BoxFuture<'a, Result<Vec<SocialPost>, SourceError>> {
        Box::pin(async move {
            let body = json!({
                "company_url": req.company_url(),
                "company_name": req.company,
                "domain": req.domain,
                "since": req.since.format("%Y-%m-%d").to_string(),
            });
            self.post_for_posts("/linkedin/company-posts", body).await
        })
    }
}

impl SourceAdapter<ProfilePostsRequest, Vec<SocialPost>> for BrowserWorkerClient {
    fn tier_id(&self) -> &'static str {
        "browser_worker_profile"
    }

    fn method(&self) -> &'static str {
        "browser worker profile scrape"
    }

    fn fetch<'a>(
        &'a self,
        req: &'a ProfilePostsRequest,
    ) -> BoxFuture<'a, Result<Vec<SocialPost>, SourceError>> {
        Box::pin(async move {
            let body = json!({
                "profile_url": req.profile.profile_url,
                "since": req.since.format("%Y-%m-%d").to_string(),
            });
            self.post_for_posts("/linkedin/profile-posts", body).await
        })
    }
}
