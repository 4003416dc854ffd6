//! External service adapters.
//!
//! Every service is reached through [`SourceAdapter`], whose `call` never
//! fails and returns a classified [`AcquisitionAttempt`]. The analyzer and the
//! CRM client sit outside the tiered model and return `Result`s directly.

pub mod adapter;
pub mod analysis;
pub mod attempt;
mod chat;
pub mod crm;
pub mod enrichment;
pub mod error;
pub mod http;
pub mod linkedin;
pub mod news;
pub mod requests;
pub mod search;

pub use adapter::SourceAdapter;
pub use analysis::{AnalysisInput, GrowthAnalyzer, OpenAiAnalyzer};
pub use attempt::{AcquisitionAttempt, AttemptOutcome, FailureClass, Payload};
pub use crm::{CrmFields, SalesforceClient};
pub use enrichment::FirmableClient;
pub use error::SourceError;
pub use http::build_http_client;
pub use linkedin::{BrightDataClient, BrowserWorkerClient, PerplexityLinkedinPosts};
pub use news::PerplexityNews;
pub use requests::{CompanyPostsRequest, NewsRequest, ProfilePostsRequest};
pub use search::{GoogleCseClient, SerpApiClient};
