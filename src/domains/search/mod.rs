//! Search domain module.
//!
//! Web search across several backends plus webpage fetching.
//!
//! ## Architecture
//!
//! - `provider.rs` - The `SearchProvider` trait: build a request, parse a response
//! - `providers/` - One file per backend (Bing, Brave, SearXNG, Tavily, Google)
//! - `registry.rs` - Sends requests, applies timeouts and maps failures
//! - `key_pool.rs` - Round-robin API key rotation
//! - `fetcher.rs` - Webpage fetching and text extraction
//! - `error.rs` - Search and fetch error types

mod error;
mod fetcher;
mod key_pool;
pub mod provider;
pub mod providers;
mod registry;
mod result;

pub use error::{FetchError, ProviderId, SearchError};
pub use fetcher::{WebpageFetcher, extract_text, parse_http_url};
pub use key_pool::ApiKeyPool;
pub use provider::{SearchProvider, SearchQuery};
pub use registry::{MAX_RESULTS, SearchProviderRegistry};
pub use result::SearchResult;
