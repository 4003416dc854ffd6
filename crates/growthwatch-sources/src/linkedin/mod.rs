//! LinkedIn post acquisition tiers.
//!
//! Company posts: `brightdata` → `browser_worker` → `perplexity_linkedin`.
//! Contact posts: `brightdata_profile` → `browser_worker_profile`.

mod brightdata;
mod browser;
mod perplexity;

pub use brightdata::{parse_ndjson_posts, BrightDataClient};
pub use browser::BrowserWorkerClient;
pub use perplexity::PerplexityLinkedinPosts;
