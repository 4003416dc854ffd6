//! Minimal client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Perplexity and OpenAI share the request and response envelope; callers
//! build the request body (model, messages, response format, search options)
//! and get back the first choice's message content.

use reqwest::Client;
use serde::Deserialize;

use crate::error::SourceError;
use crate::http::{check_status, read_json, trim_base_url};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub(crate) struct ChatClient {
    client: Client,
    service: &'static str,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    pub(crate) fn new(client: Client, service: &'static str, api_key: &str, base_url: &str) -> Self {
        Self {
            client,
            service,
            api_key: api_key.to_owned(),
            base_url: trim_base_url(base_url),
        }
    }

    pub(crate) fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    /// Send one completion request and return the first choice's content.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure.
    /// - status-derived variants for non-2xx responses.
    /// - [`SourceError::Deserialize`] if the envelope is malformed.
    /// - [`SourceError::Api`] if the response carries no content.
    pub(crate) async fn complete(&self, body: &serde_json::Value) -> Result<String, SourceError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let response = check_status(self.service, response)?;
        let envelope: ChatResponse = read_json(response, self.service).await?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_owned())
            .ok_or_else(|| SourceError::Api(format!("{} returned no completion", self.service)))
    }
}
