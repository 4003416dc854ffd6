use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Per-tier enable switches. A disabled tier is skipped by the resolver even
/// when its credentials are present.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TierToggles {
    pub serpapi: bool,
    pub google_cse: bool,
    pub firmable: bool,
    pub firmable_au: bool,
    pub brightdata: bool,
    pub browser_worker: bool,
    pub perplexity_linkedin: bool,
}

impl Default for TierToggles {
    fn default() -> Self {
        Self {
            serpapi: true,
            google_cse: true,
            firmable: true,
            firmable_au: true,
            brightdata: true,
            browser_worker: true,
            perplexity_linkedin: true,
        }
    }
}

#[derive(Clone)]
pub struct SalesforceCredentials {
    pub login_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub security_token: String,
}

/// Third-party credentials. Every entry is optional: a tier whose key is
/// missing is simply not built.
#[derive(Clone, Default)]
pub struct Credentials {
    pub serp_api_key: Option<String>,
    pub google_cse_key: Option<String>,
    pub google_cse_cx: Option<String>,
    pub firmable_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub brightdata_api_key: Option<String>,
    pub browser_worker_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub salesforce: Option<SalesforceCredentials>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub companies_path: PathBuf,
    pub output_dir: PathBuf,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub tier_timeout_secs: u64,
    pub tier_max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub inter_company_delay_secs: u64,
    pub news_recency_days: u32,
    pub posts_recency_days: u32,
    pub run_cron: String,
    pub tiers: TierToggles,
    pub credentials: Credentials,
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("serp_api_key", &redact(self.serp_api_key.as_ref()))
            .field("google_cse_key", &redact(self.google_cse_key.as_ref()))
            .field("google_cse_cx", &self.google_cse_cx)
            .field("firmable_api_key", &redact(self.firmable_api_key.as_ref()))
            .field(
                "perplexity_api_key",
                &redact(self.perplexity_api_key.as_ref()),
            )
            .field(
                "brightdata_api_key",
                &redact(self.brightdata_api_key.as_ref()),
            )
            .field("browser_worker_url", &self.browser_worker_url)
            .field("openai_api_key", &redact(self.openai_api_key.as_ref()))
            .field("openai_model", &self.openai_model)
            .field(
                "salesforce",
                &self.salesforce.as_ref().map(|sf| sf.username.as_str()),
            )
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("companies_path", &self.companies_path)
            .field("output_dir", &self.output_dir)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("tier_timeout_secs", &self.tier_timeout_secs)
            .field("tier_max_retries", &self.tier_max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("inter_company_delay_secs", &self.inter_company_delay_secs)
            .field("news_recency_days", &self.news_recency_days)
            .field("posts_recency_days", &self.posts_recency_days)
            .field("run_cron", &self.run_cron)
            .field("tiers", &self.tiers)
            .field("credentials", &self.credentials)
            .finish()
    }
}
