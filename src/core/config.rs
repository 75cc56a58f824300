//! Configuration management for the tool hub.
//!
//! Configuration is read once at startup from the environment (and an
//! optional `.env` file), overridden by command-line flags, and then frozen
//! behind an `Arc` for the lifetime of the process.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default per-call timeout for outbound requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Main configuration structure for the tool hub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Bearer token authentication.
    pub auth: AuthConfig,

    /// Search provider credentials and endpoints.
    pub search: SearchConfig,

    /// Webpage fetching defaults.
    pub fetch: FetchConfig,

    /// Security and path validation configuration.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Bearer token configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Required bearer token. `None` runs in trusted mode.
    pub token: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Search provider configuration.
///
/// Endpoint overrides exist so tests can point providers at a local mock.
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of a SearXNG instance.
    pub searxng_url: Option<String>,

    /// Brave Search API keys, used round-robin.
    pub brave_api_keys: Vec<String>,

    /// Tavily API keys, used round-robin.
    pub tavily_api_keys: Vec<String>,

    pub brave_endpoint: Option<String>,
    pub tavily_endpoint: Option<String>,
    pub bing_endpoint: Option<String>,
    pub google_endpoint: Option<String>,

    /// Timeout for a search call that does not supply one.
    pub default_timeout_secs: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            searxng_url: None,
            brave_api_keys: Vec::new(),
            tavily_api_keys: Vec::new(),
            brave_endpoint: None,
            tavily_endpoint: None,
            bing_endpoint: None,
            google_endpoint: None,
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("searxng_url", &self.searxng_url)
            .field("brave_api_keys", &format!("[{} REDACTED]", self.brave_api_keys.len()))
            .field("tavily_api_keys", &format!("[{} REDACTED]", self.tavily_api_keys.len()))
            .field("brave_endpoint", &self.brave_endpoint)
            .field("tavily_endpoint", &self.tavily_endpoint)
            .field("bing_endpoint", &self.bing_endpoint)
            .field("google_endpoint", &self.google_endpoint)
            .field("default_timeout_secs", &self.default_timeout_secs)
            .finish()
    }
}

/// Webpage fetching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent sent with outbound requests.
    pub user_agent: String,

    /// Timeout applied when a caller does not supply one.
    pub default_timeout_secs: f64,
}

/// Configuration for security and path validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Root directory confining file operations.
    /// If None, the file capability is not registered.
    pub root_path: Option<PathBuf>,

    /// Whether symlinks may be followed. When true their targets must
    /// still resolve inside the root.
    pub allow_symlinks: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "tool-hub".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "Mozilla/5.0 (compatible; tool-hub/{})",
                env!("CARGO_PKG_VERSION")
            ),
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            root_path: None,
            allow_symlinks: true,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("TOOLHUB_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("TOOLHUB_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        config.auth.token = non_empty_var("API_BEARER_TOKEN");
        if config.auth.token.is_some() {
            info!("Bearer token authentication enabled");
        } else {
            warn!("API_BEARER_TOKEN not set - running in trusted mode without authentication");
        }

        config.search.searxng_url = non_empty_var("SEARXNG_URL");
        if let Some(raw) = non_empty_var("BRAVE_API_KEY") {
            config.search.brave_api_keys = parse_key_list("BRAVE_API_KEY", &raw);
        }
        if let Some(raw) = non_empty_var("TAVILY_API_KEY") {
            config.search.tavily_api_keys = parse_key_list("TAVILY_API_KEY", &raw);
        }
        info!(
            searxng = config.search.searxng_url.is_some(),
            brave_keys = config.search.brave_api_keys.len(),
            tavily_keys = config.search.tavily_api_keys.len(),
            "Search providers configured"
        );

        if let Some(root_path) = non_empty_var("TOOLHUB_ROOT_PATH") {
            config.security.root_path = Some(PathBuf::from(root_path));
            info!("Path security enabled: root directory set to {:?}", config.security.root_path);
        }

        if let Ok(allow_symlinks) = std::env::var("TOOLHUB_ALLOW_SYMLINKS") {
            config.security.allow_symlinks = allow_symlinks.parse().unwrap_or(true);
            info!("Symlinks allowed: {}", config.security.allow_symlinks);
        }

        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a comma-separated key list.
///
/// Entries are trimmed; empty entries and entries containing whitespace are
/// skipped with a warning. Key material is never logged.
pub fn parse_key_list(var: &str, raw: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for (position, entry) in raw.split(',').enumerate() {
        let key = entry.trim();
        if key.is_empty() {
            continue;
        }
        if key.chars().any(char::is_whitespace) {
            warn!("Skipping malformed key at position {} in {}", position, var);
            continue;
        }
        keys.push(key.to_string());
    }
    keys
}
