//! Application configuration
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `SITESMITH_` prefix,
//!    `__` for nesting)
//! 2. `./sitesmith.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # sitesmith.toml
//! [github]
//! api_url = "https://api.github.com"
//! default_branch = "main"
//!
//! [cache]
//! ttl_hours = 24
//!
//! [preview]
//! debounce_ms = 1000
//! batch_window_ms = 50
//!
//! [broker]
//! bind_addr = "127.0.0.1:5000"
//! redirect_uri = "http://localhost:5173/auth/callback"
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// GitHub API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// Base URL of the GitHub REST API
    pub api_url: String,

    /// Branch used when a template URL does not name one
    pub default_branch: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            default_branch: "main".to_string(),
        }
    }
}

/// Template cache settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Hours a cached template stays valid
    pub ttl_hours: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_hours: 24 }
    }
}

/// Live-preview scheduling settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Quiet period before a debounced preview update fires, in milliseconds
    pub debounce_ms: u64,

    /// Window over which per-field edits are coalesced, in milliseconds
    pub batch_window_ms: u64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            batch_window_ms: 50,
        }
    }
}

/// OAuth token broker settings
///
/// `client_id` / `client_secret` are server-held credentials; set them via
/// `SITESMITH_BROKER__CLIENT_ID` / `SITESMITH_BROKER__CLIENT_SECRET` rather
/// than committing them to a config file. Secrets are never logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSettings {
    /// Address the broker binds to
    pub bind_addr: String,

    /// OAuth application client id
    pub client_id: String,

    /// OAuth application client secret
    pub client_secret: String,

    /// Redirect URI registered with the OAuth application
    pub redirect_uri: String,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:5173/auth/callback".to_string(),
        }
    }
}

/// Complete sitesmith configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SitesmithConfig {
    /// GitHub API settings
    #[serde(default)]
    pub github: GitHubSettings,

    /// Template cache settings
    #[serde(default)]
    pub cache: CacheSettings,

    /// Live-preview scheduling settings
    #[serde(default)]
    pub preview: PreviewSettings,

    /// OAuth token broker settings
    #[serde(default)]
    pub broker: BrokerSettings,
}

impl SitesmithConfig {
    /// Load configuration from `./sitesmith.toml` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a config source is present but malformed.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("sitesmith.toml")
    }

    /// Load configuration from a specific file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment override is malformed.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SITESMITH_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }
}
