use crate::app_config::{AppConfig, Credentials, Environment, SalesforceCredentials, TierToggles};
use crate::ConfigError;

/// Load application configuration from environment variables already in the process.
///
/// `.env` files are not read here; the binary loads them once at startup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The lookup is injected so tests can drive it from a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_flag = |var: &str| -> Result<bool, ConfigError> {
        match optional(var) {
            None => Ok(true),
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false/1/0/yes/no, got '{raw}'"))
            }),
        }
    };

    let env = parse_environment(&or_default("GW_ENV", "development"))?;
    let log_level = or_default("GW_LOG_LEVEL", "info");
    let companies_path = PathBuf::from(or_default("GW_COMPANIES_PATH", "./config/companies.yaml"));
    let output_dir = PathBuf::from(or_default("GW_OUTPUT_DIR", "./data/output"));
    let user_agent = or_default("GW_USER_AGENT", "growthwatch/0.1 (growth-intelligence)");

    let request_timeout_secs = parse_u64("GW_REQUEST_TIMEOUT_SECS", "60")?;
    let tier_timeout_secs = parse_u64("GW_TIER_TIMEOUT_SECS", "90")?;
    let tier_max_retries = parse_u32("GW_TIER_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("GW_RETRY_BACKOFF_BASE_MS", "2000")?;
    let inter_company_delay_secs = parse_u64("GW_INTER_COMPANY_DELAY_SECS", "300")?;
    let news_recency_days = parse_u32("GW_NEWS_RECENCY_DAYS", "365")?;
    let posts_recency_days = parse_u32("GW_POSTS_RECENCY_DAYS", "30")?;
    let run_cron = or_default("GW_RUN_CRON", "0 0 9 1 * *");

    if tier_timeout_secs == 0 {
        return Err(invalid(
            "GW_TIER_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let tiers = TierToggles {
        serpapi: parse_flag("GW_TIER_SERPAPI_ENABLED")?,
        google_cse: parse_flag("GW_TIER_GOOGLE_CSE_ENABLED")?,
        firmable: parse_flag("GW_TIER_FIRMABLE_ENABLED")?,
        firmable_au: parse_flag("GW_TIER_FIRMABLE_AU_ENABLED")?,
        brightdata: parse_flag("GW_TIER_BRIGHTDATA_ENABLED")?,
        browser_worker: parse_flag("GW_TIER_BROWSER_WORKER_ENABLED")?,
        perplexity_linkedin: parse_flag("GW_TIER_PERPLEXITY_LINKEDIN_ENABLED")?,
    };

    // Salesforce credentials are all-or-nothing.
    let sf_vars = [
        "SALESFORCE_CLIENT_ID",
        "SALESFORCE_CLIENT_SECRET",
        "SALESFORCE_USERNAME",
        "SALESFORCE_PASSWORD",
    ];
    let sf_present: Vec<&str> = sf_vars
        .iter()
        .copied()
        .filter(|&v| optional(v).is_some())
        .collect();
    let salesforce = if sf_present.is_empty() {
        None
    } else if let Some(missing) = sf_vars.iter().find(|&&v| optional(v).is_none()) {
        return Err(ConfigError::MissingEnvVar((*missing).to_string()));
    } else {
        Some(SalesforceCredentials {
            login_url: or_default("SALESFORCE_LOGIN_URL", "https://login.salesforce.com"),
            client_id: optional("SALESFORCE_CLIENT_ID").unwrap_or_default(),
            client_secret: optional("SALESFORCE_CLIENT_SECRET").unwrap_or_default(),
            username: optional("SALESFORCE_USERNAME").unwrap_or_default(),
            password: optional("SALESFORCE_PASSWORD").unwrap_or_default(),
            security_token: optional("SALESFORCE_SECURITY_TOKEN").unwrap_or_default(),
        })
    };

    let credentials = Credentials {
        serp_api_key: optional("SERP_API_KEY"),
        google_cse_key: optional("CUSTOM_SEARCH_API_KEY"),
        google_cse_cx: optional("CX_ID"),
        firmable_api_key: optional("FIRMABLE_API_KEY"),
        perplexity_api_key: optional("PERPLEXITY_API_KEY"),
        brightdata_api_key: optional("BRIGHTDATA_API_KEY"),
        browser_worker_url: optional("BROWSER_WORKER_URL"),
        openai_api_key: optional("OPENAI_API_KEY"),
        openai_model: or_default("OPENAI_MODEL", "gpt-4o-mini"),
        salesforce,
    };

    Ok(AppConfig {
        env,
        log_level,
        companies_path,
        output_dir,
        user_agent,
        request_timeout_secs,
        tier_timeout_secs,
        tier_max_retries,
        retry_backoff_base_ms,
        inter_company_delay_secs,
        news_recency_days,
        posts_recency_days,
        run_cron,
        tiers,
        credentials,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GW_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
