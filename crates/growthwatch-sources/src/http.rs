//! Shared `reqwest` plumbing: client construction and status/body handling.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::SourceError;

/// Build the HTTP client shared by every adapter.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the underlying `reqwest::Client` cannot be
/// constructed.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, SourceError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

pub(crate) fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_owned()
}

/// Map non-2xx statuses onto the error taxonomy.
pub(crate) fn check_status(
    service: &'static str,
    response: Response,
) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SourceError::Unauthorized { service },
        StatusCode::TOO_MANY_REQUESTS => SourceError::QuotaExceeded { service },
        other => SourceError::UnexpectedStatus {
            service,
            status: other.as_u16(),
        },
    })
}

/// Read the body as text and deserialize it, attaching `context` on failure.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, SourceError> {
    let body = response.text().await?;
    parse_json(&body, context)
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
