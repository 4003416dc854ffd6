//! Salesforce REST client for pushing growth reports onto Account records.
//!
//! The session is acquired lazily with the OAuth password grant and held for
//! the life of the client. A 401 on any data call re-runs the grant and
//! retries that call once.

use growthwatch_core::{CompanyReport, SalesforceCredentials};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::error::SourceError;
use crate::http::{check_status, read_json, trim_base_url};

const API_VERSION: &str = "v59.0";

#[derive(Debug, Clone, Deserialize)]
struct Session {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<AccountRecord>,
}

#[derive(Debug, Deserialize)]
struct AccountRecord {
    #[serde(rename = "Id")]
    id: String,
}

/// Escape a value for use inside a single-quoted SOQL string literal.
#[must_use]
pub fn escape_soql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Account fields written for one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmFields {
    pub growth_news: String,
    pub growth_actions: String,
    pub contact_activity: String,
}

impl CrmFields {
    /// Render a report into newline-joined text fields.
    #[must_use]
    pub fn from_report(report: &CompanyReport) -> Self {
        let mut news: Vec<String> = report
            .articles
            .iter()
            .map(|a| {
                let tag = if a.growth_type.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", a.growth_type)
                };
                format!("{} - {}{tag}: {}", a.date, a.headline, a.summary)
            })
            .collect();
        news.extend(
            report
                .posts
                .iter()
                .map(|p| format!("{} - LinkedIn [{}]: {}", p.date, p.growth_type, p.summary)),
        );

        let growth_actions = report
            .potential_actions
            .iter()
            .map(|a| format!("- {a}"))
            .collect::<Vec<_>>()
            .join("\n");

        let contact_activity = match report.contact_name.as_deref() {
            Some(name) => {
                let mut lines = vec![name.to_owned()];
                lines.extend(
                    report
                        .contact_posts
                        .iter()
                        .map(|p| format!("{}: {}", p.date, p.text)),
                );
                lines.join("\n")
            }
            None => String::new(),
        };

        Self {
            growth_news: news.join("\n"),
            growth_actions,
            contact_activity,
        }
    }
}

pub struct SalesforceClient {
    client: Client,
    credentials: SalesforceCredentials,
    login_url: String,
    session: RwLock<Option<Session>>,
}

impl SalesforceClient {
    #[must_use]
    pub fn new(client: Client, credentials: SalesforceCredentials) -> Self {
        let login_url = trim_base_url(&credentials.login_url);
        Self {
            client,
            credentials,
            login_url,
            session: RwLock::new(None),
        }
    }

    async fn authenticate(&self) -> Result<Session, SourceError> {
        let url = format!("{}/services/oauth2/token", self.login_url);
        let password = format!(
            "{}{}",
            self.credentials.password, self.credentials.security_token
        );
        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("username", self.credentials.username.as_str()),
                ("password", password.as_str()),
            ])
            .send()
            .await?;

        // invalid_grant comes back as 400
        if response.status() == StatusCode::BAD_REQUEST {
            return Err(SourceError::Unauthorized {
                service: "salesforce",
            });
        }
        let response = check_status("salesforce", response)?;
        let session: Session = read_json(response, "salesforce oauth token").await?;
        tracing::debug!(instance_url = %session.instance_url, "salesforce session established");
        Ok(session)
    }

    async fn current_session(&self) -> Result<Session, SourceError> {
        if let Some(session) = self.session.read().await.as_ref() {
            return Ok(session.clone());
        }
        self.refresh_session().await
    }

    async fn refresh_session(&self) -> Result<Session, SourceError> {
        let mut guard = self.session.write().await;
        let session = self.authenticate().await?;
        *guard = Some(session.clone());
        Ok(session)
    }

    async fn send_once(
        &self,
        session: &Session,
        method: &Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, SourceError> {
        let url = format!(
            "{}/services/data/{API_VERSION}{path}",
            trim_base_url(&session.instance_url)
        );
        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&session.access_token);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Send an authorized data-API request, re-authenticating once on 401.
    async fn send_authorized(
        &self,
        method: &Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, SourceError> {
        let session = self.current_session().await?;
        let response = self.send_once(&session, method, path, query, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status("salesforce", response);
        }

        tracing::info!("salesforce session expired, re-authenticating");
        let session = self.refresh_session().await?;
        let response = self.send_once(&session, method, path, query, body).await?;
        check_status("salesforce", response)
    }

    /// Look up an Account id by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NoMatch`] if no Account has that name, or any
    /// transport/auth error from the query.
    pub async fn find_account_id(&self, name: &str) -> Result<String, SourceError> {
        let soql = format!(
            "SELECT Id FROM Account WHERE Name = '{}' LIMIT 1",
            escape_soql(name)
        );
        let response = self
            .send_authorized(&Method::GET, "/query", Some(&[("q", soql.as_str())]), None)
            .await?;
        let body: QueryResponse = read_json(response, "salesforce account query").await?;

        body.records
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| SourceError::NoMatch(format!("no Salesforce Account named '{name}'")))
    }

    /// Write the growth fields of `report` onto the matching Account.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NoMatch`] if the Account does not exist, or any
    /// transport/auth error from the lookup or update.
    pub async fn push_report(&self, report: &CompanyReport) -> Result<(), SourceError> {
        let account_id = self.find_account_id(&report.company).await?;
        let fields = CrmFields::from_report(report);
        let body = json!({
            "Growth_News__c": fields.growth_news,
            "Growth_Actions__c": fields.growth_actions,
            "ContactActivity__c": fields.contact_activity,
        });

        self.send_authorized(
            &Method::PATCH,
            &format!("/sobjects/Account/{account_id}"),
            None,
            Some(&body),
        )
        .await?;

        tracing::info!(company = %report.company, account_id = %account_id, "pushed report to salesforce");
        Ok(())
    }
}
