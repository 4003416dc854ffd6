//! Shared configuration and domain types for growthwatch.
//!
//! Everything here is synchronous and I/O-free apart from reading the
//! companies file and the process environment.

pub mod app_config;
pub mod companies;
pub mod config;
pub mod dates;
pub mod growth;
pub mod report;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Credentials, Environment, SalesforceCredentials, TierToggles};
pub use companies::{load_companies, CompaniesFile, CompanyTarget};
pub use config::load_app_config_from_env;
pub use growth::GrowthType;
pub use report::{
    ArticleRecord, CompanyReport, ContactPostRecord, PostRecord, DEFAULT_ACTIONS,
    NO_RECENT_ACTIVITY,
};
pub use types::{
    AnalysisOutput, ContactProfile, EnrichmentRecord, NewsArticle, SocialPost, TaggedArticle,
    TaggedPost,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read companies file {path}: {source}")]
    CompaniesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse companies file: {0}")]
    CompaniesFileParse(#[from] serde_yaml::Error),

    #[error("companies file validation failed: {0}")]
    Validation(String),
}
