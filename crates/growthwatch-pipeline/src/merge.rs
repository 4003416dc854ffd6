//! Pure assembly of the persisted company record.

use std::cmp::Reverse;

use chrono::NaiveDate;
use growthwatch_core::dates::{parse_calendar_date, parse_post_date, post_date_label};
use growthwatch_core::{
    AnalysisOutput, ArticleRecord, CompanyReport, CompanyTarget, ContactPostRecord,
    ContactProfile, EnrichmentRecord, NewsArticle, PostRecord, SocialPost, DEFAULT_ACTIONS,
    NO_RECENT_ACTIVITY,
};

/// Contact profile together with whatever posts were found for it.
#[derive(Debug, Clone, Default)]
pub struct ContactActivity {
    pub profile: Option<ContactProfile>,
    pub posts: Vec<SocialPost>,
}

/// Build the [`CompanyReport`] for one company.
///
/// Total: every missing input degrades to an empty collection or placeholder.
/// Deterministic for a given `run_date`; sorting is stable.
#[must_use]
pub fn merge(
    target: &CompanyTarget,
    enrichment: &EnrichmentRecord,
    news: &[NewsArticle],
    company_posts: &[SocialPost],
    contact: &ContactActivity,
    analysis: &AnalysisOutput,
    run_date: NaiveDate,
) -> CompanyReport {
    let message = if analysis.reachout_message.trim().is_empty() {
        NO_RECENT_ACTIVITY.to_owned()
    } else {
        analysis.reachout_message.trim().to_owned()
    };

    let potential_actions = if analysis.actions.is_empty() {
        DEFAULT_ACTIONS.iter().map(ToString::to_string).collect()
    } else {
        analysis.actions.clone()
    };

    CompanyReport {
        company: target.name.clone(),
        articles: merge_articles(news, analysis),
        posts: merge_posts(company_posts, analysis, run_date),
        message,
        potential_actions,
        linkedin_url: enrichment
            .linkedin_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(|id| format!("https://www.linkedin.com/company/{}", id.trim()))
            .unwrap_or_default(),
        contact_name: contact.profile.as_ref().map(|p| p.name.clone()),
        contact_posts: contact
            .posts
            .iter()
            .map(|post| ContactPostRecord {
                date: render_post_date(&post.timestamp, run_date),
                text: post.text.trim().to_owned(),
            })
            .collect(),
    }
}

fn merge_articles(news: &[NewsArticle], analysis: &AnalysisOutput) -> Vec<ArticleRecord> {
    let mut dated: Vec<(Option<NaiveDate>, ArticleRecord)> = news
        .iter()
        .enumerate()
        .map(|(index, article)| {
            let record = ArticleRecord {
                headline: article.headline.clone(),
                date: article.date.clone(),
                summary: article.summary.clone(),
                growth_type: analysis
                    .article_tag(index)
                    .map(|g| g.as_str().to_owned())
                    .unwrap_or_default(),
                source_url: article.source_url.clone(),
            };
            (parse_calendar_date(&article.date), record)
        })
        .collect();

    // Undated articles sort last.
    dated.sort_by_key(|(date, _)| Reverse(*date));
    dated.into_iter().map(|(_, record)| record).collect()
}

fn merge_posts(
    posts: &[SocialPost],
    analysis: &AnalysisOutput,
    run_date: NaiveDate,
) -> Vec<PostRecord> {
    let mut dated: Vec<(Option<NaiveDate>, PostRecord)> = analysis
        .tagged_posts
        .iter()
        .filter_map(|tagged| {
            let post = posts.get(tagged.post_index)?;
            let date = parse_post_date(&post.timestamp, run_date)
                .or_else(|| parse_post_date(&tagged.date, run_date));
            let rendered = date.map_or_else(
                || fallback_date_text(&post.timestamp, &tagged.date),
                |d| post_date_label(d, run_date),
            );
            Some((
                date,
                PostRecord {
                    summary: tagged.summary.trim().to_owned(),
                    growth_type: tagged.growth_type.as_str().to_owned(),
                    date: rendered,
                },
            ))
        })
        .collect();

    dated.sort_by_key(|(date, _)| Reverse(*date));
    dated.into_iter().map(|(_, record)| record).collect()
}

fn render_post_date(raw: &str, run_date: NaiveDate) -> String {
    parse_post_date(raw, run_date)
        .map_or_else(|| raw.trim().to_owned(), |d| post_date_label(d, run_date))
}

fn fallback_date_text(timestamp: &str, echoed: &str) -> String {
    if timestamp.trim().is_empty() {
        echoed.trim().to_owned()
    } else {
        timestamp.trim().to_owned()
    }
}
