//! The persisted per-company record.
//!
//! Field names and shapes are the on-disk contract consumed downstream; every
//! field is always present.

use serde::{Deserialize, Serialize};

/// Reachout message used when analysis produced none.
pub const NO_RECENT_ACTIVITY: &str = "No recent activity";

/// Actions used when analysis produced none.
pub const DEFAULT_ACTIONS: [&str; 2] = [
    "Schedule introductory call with founders",
    "Research competitive landscape",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub headline: String,
    pub date: String,
    pub summary: String,
    /// Snake-case growth category, or `""` when untagged.
    pub growth_type: String,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub summary: String,
    pub growth_type: String,
    /// `DD/MM/YYYY - <relative>`.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPostRecord {
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyReport {
    pub company: String,
    pub articles: Vec<ArticleRecord>,
    pub posts: Vec<PostRecord>,
    pub message: String,
    pub potential_actions: Vec<String>,
    pub linkedin_url: String,
    pub contact_name: Option<String>,
    pub contact_posts: Vec<ContactPostRecord>,
}

impl CompanyReport {
    /// A report with every field at its degraded value.
    #[must_use]
    pub fn empty(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            articles: Vec::new(),
            posts: Vec::new(),
            message: NO_RECENT_ACTIVITY.to_string(),
            potential_actions: DEFAULT_ACTIONS.iter().map(ToString::to_string).collect(),
            linkedin_url: String::new(),
            contact_name: None,
            contact_posts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_serializes_every_key() {
        let value = serde_json::to_value(CompanyReport::empty("OnQ Software")).unwrap();
        let obj = value.as_object().unwrap();

        for key in [
            "company",
            "articles",
            "posts",
            "message",
            "potential_actions",
            "linkedin_url",
            "contact_name",
            "contact_posts",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert!(obj["contact_name"].is_null());
        assert_eq!(obj["message"], "No recent activity");
        assert_eq!(obj["potential_actions"].as_array().unwrap().len(), 2);
    }
}
