//! BrightData LinkedIn posts dataset (synchronous scrape endpoint).

use chrono::NaiveDate;
use futures::future::BoxFuture;
use growthwatch_core::SocialPost;
use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::adapter::SourceAdapter;
use crate::error::SourceError;
use crate::http::{check_status, trim_base_url};
use crate::requests::{CompanyPostsRequest, ProfilePostsRequest};

const BRIGHTDATA_BASE_URL: &str = "https://api.brightdata.com";
const POSTS_DATASET_ID: &str = "gd_lyy3tktm25m4avu764";

#[derive(Debug, Clone, Copy)]
enum DiscoverBy {
    CompanyUrl,
    ProfileUrl,
}

impl DiscoverBy {
    fn as_str(self) -> &'static str {
        match self {
            DiscoverBy::CompanyUrl => "company_url",
            DiscoverBy::ProfileUrl => "profile_url",
        }
    }
}

/// Parse BrightData's NDJSON body into posts.
///
/// Blank lines, lines that are not JSON objects, and objects without a
/// non-empty `post_text` are skipped.
#[must_use]
pub fn parse_ndjson_posts(body: &str) -> Vec<SocialPost> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unparseable brightdata line");
                None
            }
        })
        .filter_map(|value| {
            let text = value.get("post_text")?.as_str()?.trim();
            if text.is_empty() {
                return None;
            }
            let timestamp = value
                .get("date_posted")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default();
            Some(SocialPost {
                text: text.to_owned(),
                timestamp: timestamp.to_owned(),
            })
        })
        .collect()
}

fn window_bound(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

#[derive(Clone)]
pub struct BrightDataClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl BrightDataClient {
    #[must_use]
    pub fn new(client: Client, api_key: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_owned(),
            base_url: BRIGHTDATA_BASE_URL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    async fn scrape(
        &self,
        discover_by: DiscoverBy,
        target_url: &str,
        since: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<SocialPost>, SourceError> {
        let url = format!("{}/datasets/v3/scrape", self.base_url);
        let body = json!({
            "input": [{
                "url": target_url,
                "start_date": window_bound(since),
                "end_date": window_bound(until),
            }]
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .query(&[
                ("dataset_id", POSTS_DATASET_ID),
                ("custom_output_fields", "title,post_text,date_posted"),
                ("notify", "false"),
                ("type", "discover_new"),
                ("discover_by", discover_by.as_str()),
            ])
            .json(&body)
            .send()
            .await?;

        // 202 means the scrape outlived the synchronous window and was queued
        // as a snapshot; this tier only supports the inline result.
        if response.status() == StatusCode::ACCEPTED {
            return Err(SourceError::Api(format!(
                "brightdata queued the scrape for '{target_url}' instead of returning posts"
            )));
        }
        let response = check_status("brightdata", response)?;
        let text = response.text().await?;
        let posts = parse_ndjson_posts(&text);

        tracing::debug!(
            target = %target_url,
            discover_by = discover_by.as_str(),
            count = posts.len(),
            "brightdata scrape complete"
        );
        Ok(posts)
    }
}

impl SourceAdapter<CompanyPostsRequest, Vec<SocialPost>> for BrightDataClient {
    fn tier_id(&self) -> &'static str {
        "brightdata"
    }

    fn method(&self) -> &'static str {
        "brightdata company posts dataset"
    }

    fn fetch<'a>(
        &'a self,
        req: &'a CompanyPostsRequest,
    ) -> BoxFuture<'a, Result<Vec<SocialPost>, SourceError>> {
        Box::pin(async move {
            let company_url = req.company_url().ok_or_else(|| {
                SourceError::NoMatch(format!("no LinkedIn id for '{}'", req.company))
            })?;
            self.scrape(DiscoverBy::CompanyUrl, &company_url, req.since, req.until)
                .await
        })
    }
}

impl SourceAdapter<ProfilePostsRequest, Vec<SocialPost>> for BrightDataClient {
    fn tier_id(&self) -> &'static str {
        "brightdata_profile"
    }

    fn method(&self) -> &'static str {
        "brightdata profile posts dataset"
    }

    fn fetch<'a>(
        &'a self,
        req: &'a ProfilePostsRequest,
    ) -> BoxFuture<'a, Result<Vec<SocialPost>, SourceError>> {
        Box::pin(self.scrape(
            DiscoverBy::ProfileUrl,
            &req.profile.profile_url,
            req.since,
            req.until,
        ))
    }
}
