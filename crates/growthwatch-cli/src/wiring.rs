//! Builds the tier lists, analyzer and CRM client from configuration.
//!
//! A tier whose credentials are missing is not built at all; a tier whose
//! toggle is off is built but disabled.

use std::sync::Arc;

use growthwatch_core::AppConfig;
use growthwatch_pipeline::{CapabilityTiers, Tier};
use growthwatch_sources::{
    build_http_client, BrightDataClient, BrowserWorkerClient, FirmableClient, GoogleCseClient,
    GrowthAnalyzer, OpenAiAnalyzer, Payload, PerplexityLinkedinPosts, PerplexityNews,
    SalesforceClient, SerpApiClient, SourceAdapter,
};

pub(crate) struct Wiring {
    pub tiers: CapabilityTiers,
    pub analyzer: Option<Arc<dyn GrowthAnalyzer>>,
    pub crm: Option<Arc<SalesforceClient>>,
}

fn add<Req, T, A>(list: &mut Vec<Tier<Req, T>>, adapter: A, enabled: bool)
where
    Req: Sync + ?Sized,
    T: Payload + Send + 'static,
    A: SourceAdapter<Req, T> + 'static,
{
    let tier: Tier<Req, T> = Tier::new(Arc::new(adapter), enabled);
    if !enabled {
        tracing::info!(tier = tier.id, "tier disabled by configuration");
    }
    list.push(tier);
}

fn missing(tier: &str, var: &str) {
    tracing::warn!(tier, var, "credential not set; tier not built");
}

/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub(crate) fn build_wiring(config: &AppConfig) -> anyhow::Result<Wiring> {
    let client = build_http_client(config.request_timeout_secs, &config.user_agent)?;
    let creds = &config.credentials;
    let toggles = &config.tiers;
    let mut tiers = CapabilityTiers::default();

    match &creds.serp_api_key {
        Some(key) => {
            let serp = SerpApiClient::new(client.clone(), key);
            add(&mut tiers.identity, serp.clone(), toggles.serpapi);
            add(&mut tiers.contact, serp, toggles.serpapi);
        }
        None => {
            missing("serpapi", "SERP_API_KEY");
            missing("serpapi_contact", "SERP_API_KEY");
        }
    }

    match (&creds.google_cse_key, &creds.google_cse_cx) {
        (Some(key), Some(cx)) => add(
            &mut tiers.identity,
            GoogleCseClient::new(client.clone(), key, cx),
            toggles.google_cse,
        ),
        _ => missing("google_cse", "CUSTOM_SEARCH_API_KEY/CX_ID"),
    }

    match &creds.firmable_api_key {
        Some(key) => {
            let firmable = FirmableClient::new(client.clone(), key);
            let firmable_au = firmable.com_au();
            add(&mut tiers.enrichment, firmable, toggles.firmable);
            add(&mut tiers.enrichment, firmable_au, toggles.firmable_au);
        }
        None => missing("firmable", "FIRMABLE_API_KEY"),
    }

    match &creds.perplexity_api_key {
        Some(key) => add(&mut tiers.news, PerplexityNews::new(client.clone(), key), true),
        None => missing("perplexity_news", "PERPLEXITY_API_KEY"),
    }

    let brightdata = creds
        .brightdata_api_key
        .as_deref()
        .map(|key| BrightDataClient::new(client.clone(), key));
    let worker = creds
        .browser_worker_url
        .as_deref()
        .map(|url| BrowserWorkerClient::new(client.clone(), url));

    match &brightdata {
        Some(bd) => add(&mut tiers.company_posts, bd.clone(), toggles.brightdata),
        None => missing("brightdata", "BRIGHTDATA_API_KEY"),
    }
    match &worker {
        Some(w) => add(&mut tiers.company_posts, w.clone(), toggles.browser_worker),
        None => missing("browser_worker", "BROWSER_WORKER_URL"),
    }
    if let Some(key) = &creds.perplexity_api_key {
        add(
            &mut tiers.company_posts,
            PerplexityLinkedinPosts::new(client.clone(), key),
            toggles.perplexity_linkedin,
        );
    } else {
        missing("perplexity_linkedin", "PERPLEXITY_API_KEY");
    }

    if let Some(bd) = brightdata {
        add(&mut tiers.contact_posts, bd, toggles.brightdata);
    }
    if let Some(w) = worker {
        add(&mut tiers.contact_posts, w, toggles.browser_worker);
    }

    let analyzer: Option<Arc<dyn GrowthAnalyzer>> = match &creds.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiAnalyzer::new(
            client.clone(),
            key,
            &creds.openai_model,
        ))),
        None => {
            tracing::warn!(var = "OPENAI_API_KEY", "credential not set; analysis will use placeholders");
            None
        }
    };

    let crm = creds
        .salesforce
        .clone()
        .map(|sf| Arc::new(SalesforceClient::new(client, sf)));
    if crm.is_none() {
        tracing::info!("Salesforce credentials not set; CRM push disabled");
    }

    Ok(Wiring {
        tiers,
        analyzer,
        crm,
    })
}
