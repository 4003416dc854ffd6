use serde::{Deserialize, Serialize};

use crate::growth::GrowthType;

/// Company-data enrichment. Each field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub domain: Option<String>,
    pub linkedin_id: Option<String>,
    pub industry: Option<String>,
    pub hq_location: Option<String>,
}

impl EnrichmentRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_none()
            && self.linkedin_id.is_none()
            && self.industry.is_none()
            && self.hq_location.is_none()
    }

    /// Fill any empty field from `fallback`, keeping values already present.
    #[must_use]
    pub fn or(self, fallback: EnrichmentRecord) -> EnrichmentRecord {
        EnrichmentRecord {
            domain: self.domain.or(fallback.domain),
            linkedin_id: self.linkedin_id.or(fallback.linkedin_id),
            industry: self.industry.or(fallback.industry),
            hq_location: self.hq_location.or(fallback.hq_location),
        }
    }
}

/// A news article as returned by the news capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub headline: String,
    /// `DD/MM/YYYY` when the source date could be parsed, otherwise as given.
    pub date: String,
    pub summary: String,
    pub source_url: String,
    /// Free-text growth category reported by the source; may be empty.
    #[serde(default)]
    pub growth_label: String,
}

/// A LinkedIn post, either from the company page or a contact's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialPost {
    pub text: String,
    /// Raw timestamp: relative (`"2w"`), `DD/MM/YYYY`, or ISO/RFC 3339.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactProfile {
    pub name: String,
    pub profile_url: String,
}

/// Growth tag attached to a news article by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedArticle {
    pub article_index: usize,
    pub growth_type: GrowthType,
}

/// A company post classified as a growth signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedPost {
    pub post_index: usize,
    pub summary: String,
    pub growth_type: GrowthType,
    /// Date as echoed back by the classifier; the post's own timestamp wins
    /// when both parse.
    pub date: String,
}

/// Result of the analysis step. `Default` is the placeholder used when the
/// analyzer fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub tagged_articles: Vec<TaggedArticle>,
    pub tagged_posts: Vec<TaggedPost>,
    pub reachout_message: String,
    pub actions: Vec<String>,
}

impl AnalysisOutput {
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn article_tag(&self, index: usize) -> Option<GrowthType> {
        self.tagged_articles
            .iter()
            .find(|t| t.article_index == index)
            .map(|t| t.growth_type)
    }
}
