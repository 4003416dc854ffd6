//! Integration tests for identity, contact and enrichment adapters using
//! wiremock HTTP mocks.

use growthwatch_core::{CompanyTarget, ContactProfile, EnrichmentRecord};
use growthwatch_sources::{
    AttemptOutcome, FailureClass, FirmableClient, GoogleCseClient, SerpApiClient, SourceAdapter,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn target() -> CompanyTarget {
    CompanyTarget::new("LAB Group", "Melbourne")
}

#[tokio::test]
async fn serpapi_resolves_clean_domain() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google"))
        .and(query_param("gl", "au"))
        .and(query_param("q", "LAB Group Melbourne"))
        .and(query_param("api_key", "serp-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "organic_results": [
                { "link": "https://www.LabGroup.com.au/", "title": "LAB Group" },
                { "link": "https://example.com", "title": "Other" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SerpApiClient::new(reqwest::Client::new(), "serp-key").with_base_url(&server.uri());
    let attempt = SourceAdapter::<CompanyTarget, String>::call(&client, &target()).await;

    assert_eq!(attempt.tier, "serpapi");
    assert_eq!(
        attempt.outcome,
        AttemptOutcome::Success("labgroup.com.au".to_owned())
    );
}

#[tokio::test]
async fn serpapi_no_results_is_soft_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "Google hasn't returned any results for this query."
        })))
        .mount(&server)
        .await;

    let client = SerpApiClient::new(reqwest::Client::new(), "serp-key").with_base_url(&server.uri());
    let attempt = SourceAdapter::<CompanyTarget, String>::call(&client, &target()).await;

    assert!(matches!(attempt.outcome, AttemptOutcome::SoftFailure(_)));
}

#[tokio::test]
async fn serpapi_bad_key_is_hard_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = SerpApiClient::new(reqwest::Client::new(), "bad").with_base_url(&server.uri());
    let attempt = SourceAdapter::<CompanyTarget, String>::call(&client, &target()).await;

    assert!(matches!(
        attempt.outcome,
        AttemptOutcome::HardFailure {
            class: FailureClass::Hard,
            ..
        }
    ));
}

#[tokio::test]
async fn serpapi_contact_search_extracts_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param(
            "q",
            "site:linkedin.com/in \"LAB Group\" (founder OR CEO OR \"managing director\")",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "organic_results": [
                { "link": "https://www.labgroup.com.au/team", "title": "Our team" },
                {
                    "link": "https://au.linkedin.com/in/jane-citizen",
                    "title": "Jane Citizen - Founder & CEO - LAB Group | LinkedIn"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = SerpApiClient::new(reqwest::Client::new(), "serp-key").with_base_url(&server.uri());
    let attempt = SourceAdapter::<CompanyTarget, ContactProfile>::call(&client, &target()).await;

    assert_eq!(attempt.tier, "serpapi_contact");
    assert_eq!(
        attempt.outcome,
        AttemptOutcome::Success(ContactProfile {
            name: "Jane Citizen".to_owned(),
            profile_url: "https://au.linkedin.com/in/jane-citizen".to_owned(),
        })
    );
}

#[tokio::test]
async fn google_cse_uses_first_item() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("cx", "cx-id"))
        .and(query_param("num", "1"))
        .and(query_param("q", "LAB Group Melbourne official site"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{ "link": "http://labgroup.com.au/home" }]
        })))
        .mount(&server)
        .await;

    let client = GoogleCseClient::new(reqwest::Client::new(), "cse-key", "cx-id")
        .with_base_url(&server.uri());
    let attempt = client.call(&target()).await;

    assert_eq!(
        attempt.outcome,
        AttemptOutcome::Success("labgroup.com.au".to_owned())
    );
}

#[tokio::test]
async fn google_cse_without_items_is_soft_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "searchInformation": { "totalResults": "0" }
        })))
        .mount(&server)
        .await;

    let client = GoogleCseClient::new(reqwest::Client::new(), "cse-key", "cx-id")
        .with_base_url(&server.uri());
    let attempt = client.call(&target()).await;

    assert!(matches!(attempt.outcome, AttemptOutcome::SoftFailure(_)));
}

#[tokio::test]
async fn firmable_maps_company_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/company"))
        .and(query_param("website", "grc-solutions.com"))
        .and(header("authorization", "Bearer firm-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "website": "https://www.grc-solutions.com",
            "linkedin": "https://www.linkedin.com/company/grc-solutions-pty-ltd",
            "industries": ["E-learning and online education", "Software"],
            "hq_location": "201 Kent St, Level 14, Sydney, NSW, 2000, AU"
        })))
        .mount(&server)
        .await;

    let client = FirmableClient::new(reqwest::Client::new(), "firm-key").with_base_url(&server.uri());
    let attempt = client.call("grc-solutions.com").await;

    assert_eq!(attempt.tier, "firmable");
    assert_eq!(
        attempt.outcome,
        AttemptOutcome::Success(EnrichmentRecord {
            domain: Some("grc-solutions.com".to_owned()),
            linkedin_id: Some("grc-solutions-pty-ltd".to_owned()),
            industry: Some("E-learning and online education".to_owned()),
            hq_location: Some("201 Kent St, Level 14, Sydney, NSW, 2000, AU".to_owned()),
        })
    );
}

#[tokio::test]
async fn firmable_au_variant_queries_com_au() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/company"))
        .and(query_param("website", "onq.com.au"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "website": "onq.com.au",
            "industries": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FirmableClient::new(reqwest::Client::new(), "firm-key")
        .with_base_url(&server.uri())
        .com_au();
    let attempt = client.call("onq.com").await;

    assert_eq!(attempt.tier, "firmable_au");
    match attempt.outcome {
        AttemptOutcome::Success(record) => {
            assert_eq!(record.domain.as_deref(), Some("onq.com.au"));
            assert!(record.linkedin_id.is_none());
            assert!(record.industry.is_none());
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn firmable_au_variant_skips_au_domains() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = FirmableClient::new(reqwest::Client::new(), "firm-key")
        .with_base_url(&server.uri())
        .com_au();
    let attempt = client.call("labgroup.com.au").await;

    assert!(matches!(attempt.outcome, AttemptOutcome::SoftFailure(_)));
}

#[tokio::test]
async fn firmable_not_found_is_soft_and_server_error_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("website", "missing.com"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("website", "flaky.com"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = FirmableClient::new(reqwest::Client::new(), "firm-key").with_base_url(&server.uri());

    let missing = client.call("missing.com").await;
    assert!(matches!(missing.outcome, AttemptOutcome::SoftFailure(_)));

    let flaky = client.call("flaky.com").await;
    assert!(flaky.is_transient_failure());
}
