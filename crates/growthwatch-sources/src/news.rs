//! Growth news discovery through Perplexity's search-grounded completions.

use std::cmp::Reverse;

use futures::future::BoxFuture;
use growthwatch_core::dates::{normalize_article_date, parse_calendar_date};
use growthwatch_core::NewsArticle;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::adapter::SourceAdapter;
use crate::chat::ChatClient;
use crate::error::SourceError;
use crate::http::parse_json;
use crate::requests::NewsRequest;

pub(crate) const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
pub(crate) const PERPLEXITY_MODEL: &str = "sonar-pro";

/// Australian business press searched alongside the company's own site.
pub const NEWS_DOMAINS: [&str; 6] = [
    "afr.com",
    "insidesmallbusiness.com.au",
    "dynamicbusiness.com",
    "smartcompany.com.au",
    "startupdaily.net",
    "businessnews.com.au",
];

#[derive(Debug, Deserialize)]
struct NewsPayload {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    growth_type: String,
    #[serde(default)]
    source_url: String,
}

fn article_schema() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "schema": {
                "type": "object",
                "properties": {
                    "company": { "type": "string" },
                    "articles": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "headline": { "type": "string" },
                                "date": {
                                    "type": "string",
                                    "description": "Publish date of the article strictly in 'DD/MM/YYYY' format"
                                },
                                "summary": { "type": "string" },
                                "growth_type": { "type": "string" },
                                "source_url": { "type": "string" }
                            },
                            "required": ["headline", "date", "summary", "growth_type", "source_url"]
                        }
                    }
                },
                "required": ["company", "articles"]
            }
        }
    })
}

fn news_prompt(req: &NewsRequest) -> String {
    let mut prompt = format!(
        "The company you will be finding news articles for is {} located in {}. ",
        req.company, req.location
    );
    if let Some(hq) = req.hq_location.as_deref() {
        prompt.push_str(&format!("{} is currently headquartered at {hq}. ", req.company));
    }
    if let Some(industry) = req.industry.as_deref() {
        prompt.push_str(&format!(
            "They are primarily in the {} industries. ",
            industry.to_lowercase()
        ));
    }
    prompt.push_str(&format!(
        "Find news articles indicating growth (awards, expansion, new hires, partnerships, \
         patents, financial success, etc) for {}. Only return news for this specific company \
         and location, do not confuse it with other companies with similar names.",
        req.company
    ));
    prompt
}

/// Sort newest first; articles whose date cannot be parsed go last, in their
/// original relative order.
pub(crate) fn sort_newest_first(articles: &mut [NewsArticle]) {
    articles.sort_by_key(|a| Reverse(parse_calendar_date(&a.date)));
}

#[derive(Clone)]
pub struct PerplexityNews {
    chat: ChatClient,
}

impl PerplexityNews {
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

    fn request_body(req: &NewsRequest) -> serde_json::Value {
        let mut domains: Vec<String> = Vec::with_capacity(NEWS_DOMAINS.len() + 1);
        if let Some(domain) = req.domain.as_deref() {
            domains.push(domain.to_owned());
        }
        domains.extend(NEWS_DOMAINS.iter().map(|d| (*d).to_owned()));

        json!({
            "model": PERPLEXITY_MODEL,
            "messages": [{ "role": "user", "content": news_prompt(req) }],
            "search_domain_filter": domains,
            "search_after_date_filter": req.published_after.format("%-m/%-d/%Y").to_string(),
            "web_search_options": {
                "user_location": { "country": "AU", "city": req.location }
            },
            "response_format": article_schema(),
        })
    }

    async fn pull_news(&self, req: &NewsRequest) -> Result<Vec<NewsArticle>, SourceError> {
        let content = self.chat.complete(&Self::request_body(req)).await?;
        let payload: NewsPayload = parse_json(&content, "perplexity news payload")?;

        let mut articles: Vec<NewsArticle> = payload
            .articles
            .into_iter()
            .filter(|a| !a.headline.trim().is_empty())
            .map(|a| NewsArticle {
                headline: a.headline.trim().to_owned(),
                date: normalize_article_date(&a.date),
                summary: a.summary.trim().to_owned(),
                source_url: a.source_url.trim().to_owned(),
                growth_label: a.growth_type.trim().to_owned(),
            })
            .collect();
        sort_newest_first(&mut articles);

        tracing::debug!(
            company = %req.company,
            count = articles.len(),
            "perplexity returned articles"
        );
        Ok(articles)
    }
}

impl SourceAdapter<NewsRequest, Vec<NewsArticle>> for PerplexityNews {
    fn tier_id(&self) -> &'static str {
        "perplexity_news"
    }

    fn method(&self) -> &'static str {
        "perplexity sonar-pro news search"
    }

    fn fetch<'a>(
        &'a self,
        req: &'a NewsRequest,
    ) -> BoxFuture<'a, Result<Vec<NewsArticle>, SourceError>> {
        Box::pin(self.pull_news(req))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn article(headline: &str, date: &str) -> NewsArticle {
        NewsArticle {
            headline: headline.to_owned(),
            date: date.to_owned(),
            ..NewsArticle::default()
        }
    }

    #[test]
    fn sorts_newest_first_with_unparseable_last() {
        let mut articles = vec![
            article("old", "01/02/2025"),
            article("undated-a", "sometime"),
            article("new", "15/11/2025"),
            article("undated-b", ""),
        ];
        sort_newest_first(&mut articles);
        let order: Vec<&str> = articles.iter().map(|a| a.headline.as_str()).collect();
        assert_eq!(order, ["new", "old", "undated-a", "undated-b"]);
    }

    #[test]
    fn request_body_carries_filters() {
        let req = NewsRequest {
            company: "GRC Solutions".to_owned(),
            location: "Sydney".to_owned(),
            domain: Some("grc-solutions.com".to_owned()),
            industry: Some("E-learning".to_owned()),
            hq_location: None,
            published_after: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
        };
        let body = PerplexityNews::request_body(&req);

        assert_eq!(body["model"], "sonar-pro");
        assert_eq!(body["search_domain_filter"][0], "grc-solutions.com");
        assert_eq!(body["search_domain_filter"].as_array().unwrap().len(), 7);
        assert_eq!(body["search_after_date_filter"], "3/7/2025");
        assert_eq!(body["web_search_options"]["user_location"]["city"], "Sydney");

        let prompt = body["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("e-learning industries"));
        assert!(!prompt.contains("headquartered"));
    }
}
