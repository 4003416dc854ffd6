use std::path::PathBuf;

use growthwatch_sources::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CRM delivery failed: {0}")]
    Crm(#[from] SourceError),
}
