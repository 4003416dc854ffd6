use thiserror::Error;

/// Errors returned by external service adapters.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a status code the adapter does not handle.
    #[error("{service} returned HTTP {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    /// 401/403: credentials rejected.
    #[error("{service} rejected credentials")]
    Unauthorized { service: &'static str },

    /// 429: rate limit or plan quota exhausted.
    #[error("{service} quota exceeded")]
    QuotaExceeded { service: &'static str },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The lookup key was missing or the service had no match for it.
    #[error("no match: {0}")]
    NoMatch(String),

    /// Application-level error reported inside a 2xx response.
    #[error("API error: {0}")]
    Api(String),
}

impl SourceError {
    /// Returns `true` for errors that are worth retrying after a back-off delay.
    ///
    /// **Retriable:** network-level failures (timeout, connect) and HTTP 5xx.
    ///
    /// **Not retriable:** credential and quota errors, malformed bodies,
    /// other 4xx statuses, API-level errors and misses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            SourceError::UnexpectedStatus { status, .. } => (500..600).contains(status),
            SourceError::Unauthorized { .. }
            | SourceError::QuotaExceeded { .. }
            | SourceError::Deserialize { .. }
            | SourceError::NoMatch(_)
            | SourceError::Api(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = SourceError::UnexpectedStatus {
            service: "firmable",
            status: 503,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = SourceError::UnexpectedStatus {
            service: "firmable",
            status: 404,
        };
        assert!(!err.is_transient());
        assert!(!SourceError::Unauthorized { service: "serpapi" }.is_transient());
        assert!(!SourceError::QuotaExceeded { service: "serpapi" }.is_transient());
        assert!(!SourceError::NoMatch("no linkedin id".to_owned()).is_transient());
        assert!(!SourceError::Api("bad".to_owned()).is_transient());
    }

    #[test]
    fn deserialize_error_is_not_transient() {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        let err = SourceError::Deserialize {
            context: "test".to_owned(),
            source: src,
        };
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn connect_failure_is_transient() {
        let err = reqwest::Client::new()
            .get("http://0.0.0.0:1")
            .send()
            .await
            .unwrap_err();
        assert!(SourceError::Http(err).is_transient());
    }
}
