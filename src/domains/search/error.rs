//! Search and fetch error types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Bing,
    Brave,
    SearXng,
    Tavily,
    Google,
}

impl ProviderId {
    /// Every provider, in the order operations are published.
    pub const ALL: [ProviderId; 5] = [
        ProviderId::Bing,
        ProviderId::Brave,
        ProviderId::SearXng,
        ProviderId::Tavily,
        ProviderId::Google,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bing => "bing",
            Self::Brave => "brave",
            Self::SearXng => "searxng",
            Self::Tavily => "tavily",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SearchError::UnknownProvider(s.to_string()))
    }
}

/// Errors raised by search providers.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Required credentials or endpoint are missing.
    #[error("Search provider '{provider}' is not configured: {hint}")]
    ProviderUnconfigured {
        provider: ProviderId,
        hint: &'static str,
    },

    /// The upstream could not be reached or answered with an error status.
    #[error("Search provider '{provider}' is unavailable: {message}")]
    ProviderUnavailable {
        provider: ProviderId,
        message: String,
    },

    /// The upstream did not answer within the caller's timeout.
    #[error("Search provider '{provider}' timed out after {timeout:?}")]
    ProviderTimeout {
        provider: ProviderId,
        timeout: Duration,
    },

    #[error("Unknown search provider: {0}")]
    UnknownProvider(String),
}

impl SearchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProviderUnconfigured { .. } => "provider_unconfigured",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::ProviderTimeout { .. } => "provider_timeout",
            Self::UnknownProvider(_) => "unknown_provider",
        }
    }
}

/// Errors raised while fetching a webpage.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Not an absolute http(s) URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid proxy: {reason}")]
    InvalidProxy { reason: String },

    #[error("Fetching '{url}' timed out after {timeout:?}")]
    FetchTimeout { url: String, timeout: Duration },

    #[error("Failed to fetch '{url}': {message}")]
    FetchConnectionError { url: String, message: String },
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::InvalidProxy { .. } => "invalid_proxy",
            Self::FetchTimeout { .. } => "fetch_timeout",
            Self::FetchConnectionError { .. } => "fetch_connection_error",
        }
    }
}
