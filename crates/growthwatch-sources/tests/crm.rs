//! Integration tests for `SalesforceClient` using wiremock HTTP mocks.

use growthwatch_core::{CompanyReport, SalesforceCredentials};
use growthwatch_sources::{SalesforceClient, SourceError};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(login_url: &str) -> SalesforceCredentials {
    SalesforceCredentials {
        login_url: login_url.to_owned(),
        client_id: "client-id".to_owned(),
        client_secret: "client-secret".to_owned(),
        username: "ops@example.com".to_owned(),
        password: "hunter2".to_owned(),
        security_token: "TOKEN".to_owned(),
    }
}

async fn mount_token(server: &MockServer, access_token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("password=hunter2TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": access_token,
            "instance_url": server.uri(),
        })))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn push_report_updates_matching_account() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .and(query_param(
            "q",
            "SELECT Id FROM Account WHERE Name = 'O\\'Brien Labs' LIMIT 1",
        ))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalSize": 1,
            "records": [{ "Id": "001ABC" }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/services/data/v59.0/sobjects/Account/001ABC"))
        .and(body_partial_json(serde_json::json!({
            "Growth_Actions__c": "- Schedule introductory call with founders\n- Research competitive landscape",
            "ContactActivity__c": ""
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = SalesforceClient::new(reqwest::Client::new(), credentials(&server.uri()));
    client
        .push_report(&CompanyReport::empty("O'Brien Labs"))
        .await
        .expect("push should succeed");
}

#[tokio::test]
async fn missing_account_is_no_match() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-1", 1).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalSize": 0,
            "records": []
        })))
        .mount(&server)
        .await;

    let client = SalesforceClient::new(reqwest::Client::new(), credentials(&server.uri()));
    let err = client
        .push_report(&CompanyReport::empty("Partmax"))
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::NoMatch(_)));
}

#[tokio::test]
async fn expired_session_reauthenticates_once() {
    let server = MockServer::start().await;
    mount_token(&server, "tok-1", 2).await;

    // First query is rejected, the retry after re-authentication succeeds.
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "records": [{ "Id": "001XYZ" }]
        })))
        .mount(&server)
        .await;

    let client = SalesforceClient::new(reqwest::Client::new(), credentials(&server.uri()));
    let id = client
        .find_account_id("LAB Group")
        .await
        .expect("lookup should succeed after re-auth");

    assert_eq!(id, "001XYZ");
}

#[tokio::test]
async fn rejected_login_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "authentication failure"
        })))
        .mount(&server)
        .await;

    let client = SalesforceClient::new(reqwest::Client::new(), credentials(&server.uri()));
    let err = client.find_account_id("LAB Group").await.unwrap_err();

    assert!(matches!(err, SourceError::Unauthorized { service: "salesforce" }));
}
