//! Search backends.

pub mod bing;
pub mod brave;
pub mod google;
pub mod searxng;
pub mod tavily;

pub use bing::BingProvider;
pub use brave::BraveProvider;
pub use google::GoogleProvider;
pub use searxng::SearxngProvider;
pub use tavily::TavilyProvider;
