//! Growth analysis: tag articles and posts, draft a reachout message and
//! suggest relationship-building actions.

use std::collections::HashSet;
use std::sync::LazyLock;

use futures::future::BoxFuture;
use growthwatch_core::{
    AnalysisOutput, GrowthType, NewsArticle, SocialPost, TaggedArticle, TaggedPost,
};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::chat::ChatClient;
use crate::error::SourceError;
use crate::http::parse_json;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_ARTICLES_IN_PROMPT: usize = 5;

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d.\-)\s]+").expect("valid regex"));

/// Everything the analyzer gets to see for one company.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub company: String,
    pub articles: Vec<NewsArticle>,
    pub posts: Vec<SocialPost>,
}

/// Black-box growth analysis.
pub trait GrowthAnalyzer: Send + Sync {
    fn name(&self) -> &'static str;

    fn analyze<'a>(
        &'a self,
        input: &'a AnalysisInput,
    ) -> BoxFuture<'a, Result<AnalysisOutput, SourceError>>;
}

/// Tag articles from the growth label their source already attached.
#[must_use]
pub fn tag_articles(articles: &[NewsArticle]) -> Vec<TaggedArticle> {
    articles
        .iter()
        .enumerate()
        .filter_map(|(article_index, a)| {
            GrowthType::from_label(&a.growth_label).map(|growth_type| TaggedArticle {
                article_index,
                growth_type,
            })
        })
        .collect()
}

/// Parse a numbered action list into clean single-line actions.
///
/// Numbering and markdown emphasis are stripped; sub-bullets, header lines
/// ending in `:` and fragments of 15 characters or fewer are dropped.
#[must_use]
pub fn parse_actions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('-'))
        .filter_map(|line| {
            let numbered = line.starts_with(|c: char| c.is_ascii_digit());
            let stripped = if numbered {
                LIST_MARKER_RE.replace(line, "").into_owned()
            } else {
                line.to_owned()
            };
            let clean = stripped.replace("**", "").replace('*', "").trim().to_owned();

            let min_len = if numbered { 16 } else { 21 };
            (!clean.ends_with(':') && clean.chars().count() >= min_len).then_some(clean)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct PostClassification {
    posts: Vec<ClassifiedPost>,
}

#[derive(Debug, Deserialize)]
struct ClassifiedPost {
    post_index: i64,
    is_growth_indicator: bool,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    growth_type: String,
    #[serde(default)]
    date: String,
}

/// Keep growth posts whose index is in range and whose label maps onto a
/// known growth type. The first classification of an index wins.
fn select_growth_posts(classified: Vec<ClassifiedPost>, post_count: usize) -> Vec<TaggedPost> {
    let mut seen = HashSet::new();
    classified
        .into_iter()
        .filter(|c| c.is_growth_indicator)
        .filter_map(|c| {
            let post_index = usize::try_from(c.post_index).ok()?;
            if post_index >= post_count || !seen.insert(post_index) {
                return None;
            }
            let Some(growth_type) = GrowthType::from_label(&c.growth_type) else {
                tracing::debug!(
                    post_index,
                    label = %c.growth_type,
                    "dropping growth post with unrecognised type"
                );
                return None;
            };
            Some(TaggedPost {
                post_index,
                summary: c.summary.trim().to_owned(),
                growth_type,
                date: c.date.trim().to_owned(),
            })
        })
        .collect()
}

fn posts_batch_schema() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "linkedin_posts_batch_analysis",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "posts": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "post_index": {
                                    "type": "integer",
                                    "description": "Index of the post in the original list (0-based)"
                                },
                                "is_growth_indicator": {
                                    "type": "boolean",
                                    "description": "Whether this post indicates company growth"
                                },
                                "summary": {
                                    "type": "string",
                                    "description": "Brief summary of the post content"
                                },
                                "growth_type": {
                                    "type": "string",
                                    "description": "One of: awards, expansion, new_hires, partnerships, patents, funding, product_launch, market_expansion, client_acquisition. Empty string if not a growth indicator."
                                },
                                "date": {
                                    "type": "string",
                                    "description": "Date from the post"
                                }
                            },
                            "required": ["post_index", "is_growth_indicator", "summary", "growth_type", "date"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["posts"],
                "additionalProperties": false
            }
        }
    })
}

fn signals_text(input: &AnalysisInput, growth_posts: &[TaggedPost]) -> Option<String> {
    let mut signals = String::new();
    if !growth_posts.is_empty() {
        signals.push_str("LinkedIn growth signals:\n");
        for post in growth_posts {
            signals.push_str(&format!("- [{}] {}\n", post.growth_type, post.summary));
        }
    }
    if !input.articles.is_empty() {
        signals.push_str("Recent news:\n");
        for article in input.articles.iter().take(MAX_ARTICLES_IN_PROMPT) {
            let label = article.growth_label.trim();
            if label.is_empty() {
                signals.push_str(&format!("- {}\n", article.headline));
            } else {
                signals.push_str(&format!("- {} ({label})\n", article.headline));
            }
        }
    }
    (!signals.is_empty()).then_some(signals)
}

/// OpenAI chat-completions analyzer.
#[derive(Clone)]
pub struct OpenAiAnalyzer {
    chat: ChatClient,
    model: String,
}

impl OpenAiAnalyzer {
    #[must_use]
    pub fn new(client: Client, api_key: &str, model: &str) -> Self {
        Self {
            chat: ChatClient::new(client, "openai", api_key, OPENAI_BASE_URL),
            model: model.to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.chat = self.chat.with_base_url(base_url);
        self
    }

    async fn classify_posts(&self, posts: &[SocialPost]) -> Result<Vec<TaggedPost>, SourceError> {
        let mut listing = String::new();
        for (i, post) in posts.iter().enumerate() {
            listing.push_str(&format!(
                "Post #{i}:\n- Date: {}\n- Content: {}\n\n",
                post.timestamp, post.text
            ));
        }

        let user_prompt = format!(
            "Analyze these LinkedIn posts and determine which ones indicate company growth.\n\n\
             Growth indicators include awards and recognition, business expansion, new hires or \
             team growth, partnerships or collaborations, patents or innovations, financial \
             success or funding, product launches or major updates, market expansion, and client \
             acquisitions.\n\n\
             For each post, determine if it indicates growth. Provide a brief summary, identify \
             the growth type, and extract the date.\n\n{listing}Analyze all {} posts above.",
            posts.len()
        );

        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert business analyst who identifies company growth indicators from social media posts."
                },
                { "role": "user", "content": user_prompt }
            ],
            "response_format": posts_batch_schema(),
        });

        let content = self.chat.complete(&body).await?;
        let parsed: PostClassification = parse_json(&content, "openai post classification")?;
        Ok(select_growth_posts(parsed.posts, posts.len()))
    }

    async fn reachout_message(&self, company: &str, signals: &str) -> Result<String, SourceError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are writing a LinkedIn message on behalf of a partner at a private equity firm \
                                that backs founder-led software and technology businesses in Australia and New Zealand. \
                                Write like a real person: short sentences, casual but professional, no buzzwords, \
                                no emojis, no subject line. Keep it under 80 words."
                },
                {
                    "role": "user",
                    "content": format!(
                        "Write a LinkedIn message to a founder/executive at {company}.\n\n{signals}\n\
                         Rules:\n\
                         - Open with something specific you noticed about their business\n\
                         - Keep it conversational\n\
                         - End with a low-pressure suggestion (coffee or a quick call)"
                    )
                }
            ],
        });
        self.chat.complete(&body).await
    }

    async fn potential_actions(
        &self,
        company: &str,
        signals: &str,
    ) -> Result<Vec<String>, SourceError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a relationship-focused advisor for a private equity firm. Suggest specific, \
                                in-person ways for investment analysts to build genuine relationships with company \
                                founders and executives. Focus on meetings, events and introductions, not research."
                },
                {
                    "role": "user",
                    "content": format!(
                        "Based on these signals about {company}, suggest 4-6 ways to build a relationship \
                         with the founders/executives:\n\n{signals}\n\
                         Format as a simple numbered list. Each action should be a single clear sentence \
                         tailored to this company. No markdown, no bold, no sub-bullets."
                    )
                }
            ],
        });
        let text = self.chat.complete(&body).await?;
        Ok(parse_actions(&text))
    }

    async fn run(&self, input: &AnalysisInput) -> Result<AnalysisOutput, SourceError> {
        let tagged_articles = tag_articles(&input.articles);

        let tagged_posts = if input.posts.is_empty() {
            Vec::new()
        } else {
            self.classify_posts(&input.posts).await?
        };

        let Some(signals) = signals_text(input, &tagged_posts) else {
            tracing::debug!(company = %input.company, "no growth signals, skipping generation");
            return Ok(AnalysisOutput {
                tagged_articles,
                tagged_posts,
                ..AnalysisOutput::default()
            });
        };

        let reachout_message = match self.reachout_message(&input.company, &signals).await {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(company = %input.company, error = %e, "reachout message generation failed");
                String::new()
            }
        };

        let actions = match self.potential_actions(&input.company, &signals).await {
            Ok(actions) => actions,
            Err(e) => {
                tracing::warn!(company = %input.company, error = %e, "action generation failed");
                Vec::new()
            }
        };

        Ok(AnalysisOutput {
            tagged_articles,
            tagged_posts,
            reachout_message,
            actions,
        })
    }
}

impl GrowthAnalyzer for OpenAiAnalyzer {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn analyze<'a>(
        &'a self,
        input: &'a AnalysisInput,
    ) -> BoxFuture<'a, Result<AnalysisOutput, SourceError>> {
        Box::pin(self.run(input))
    }
}
