use futures::future::BoxFuture;
use growthwatch_core::SocialPost;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::adapter::SourceAdapter;
use crate::chat::ChatClient;
use crate::error::SourceError;
use crate::http::parse_json;
use crate::news::{PERPLEXITY_BASE_URL, PERPLEXITY_MODEL};
use crate::requests::CompanyPostsRequest;

#[derive(Debug, Deserialize)]
struct PostsPayload {
    #[serde(default)]
    posts: Vec<RawPost>,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    date: String,
    #[serde(default)]
    text: String,
}

fn posts_schema() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "schema": {
                "type": "object",
                "properties": {
                    "posts": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "date": {
                                    "type": "string",
                                    "description": "Date of the post strictly in 'DD/MM/YYYY' format"
                                },
                                "text": { "type": "string" }
                            },
                            "required": ["date", "text"]
                        }
                    }
                },
                "required": ["posts"]
            }
        }
    })
}

/// Last-resort company posts: Perplexity search restricted to `linkedin.com`.
#[derive(Clone)]
pub struct PerplexityLinkedinPosts {
    chat: ChatClient,
}

impl PerplexityLinkedinPosts {
    #[must_use]
    pub fn new(client: Client, api_key: &str) -> Self {
        Self {
            chat: ChatClient::new(client, "perplexity", api_key, PERPLEXITY_BASE_URL),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.chat = self.chat.with_base_url(base_url);
        self
    }

    async fn search_posts(&self, req: &CompanyPostsRequest) -> Result<Vec<SocialPost>, SourceError> {
        let mut subject = req.company.clone();
        if let Some(domain) = req.domain.as_deref() {
            subject.push_str(&format!(" (website {domain})"));
        }
        if let Some(url) = req.company_url() {
            subject.push_str(&format!(", LinkedIn page {url}"));
        }

        let body = json!({
            "model": PERPLEXITY_MODEL,
            "messages": [{
                "role": "user",
                "content": format!(
                    "List the most recent LinkedIn posts published by the company page of {subject}. \
                     Return the full post text and its publish date. Only include posts from this \
                     exact company."
                ),
            }],
            "search_domain_filter": ["linkedin.com"],
            "search_after_date_filter": req.since.format("%-m/%-d/%Y").to_string(),
            "response_format": posts_schema(),
        });

        let content = self.chat.complete(&body).await?;
        let payload: PostsPayload = parse_json(&content, "perplexity linkedin posts")?;

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

impl SourceAdapter<CompanyPostsRequest, Vec<SocialPost>> for PerplexityLinkedinPosts {
    fn tier_id(&self) -> &'static str {
        "perplexity_linkedin"
    }

    fn method(&self) -> &'static str {
        "perplexity linkedin search"
    }

    fn fetch<'a>(
        &'a self,
        req: &'a CompanyPostsRequest,
    ) -> BoxFuture<'a, Result<Vec<SocialPost>, SourceError>> {
        Box::pin(self.search_posts(req))
    }
}
