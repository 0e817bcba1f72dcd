//! Centralized configuration for the Chirper client.
//!
//! Constants for network behaviour and feed timing, plus the runtime
//! [`ClientSettings`] that tell the client where the backend lives.

use crate::error::{ChirperError, Result};
use std::env;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const USER_AGENT: &'static str = "chirper-client/0.1";
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const MAX_RETRIES: u32 = 3;
    pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
    pub const THROTTLE_DELAY: Duration = Duration::from_millis(500);
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000/api";
}

/// Feed behaviour and presentation.
pub struct FeedConfig;

impl FeedConfig {
    /// How often the first page is re-fetched while the feed is open.
    pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 15);
    /// Shorter refresh periods are raised to this.
    pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);
    pub const COMPOSER_PLACEHOLDER: &'static str = "What's on your mind?";
    pub const REQUIRED_MESSAGE: &'static str = "The message field is required.";
}

/// Environment variable names read by [`ClientSettings::from_env`].
pub struct EnvVars;

impl EnvVars {
    pub const BASE_URL: &'static str = "CHIRPER_API_URL";
    pub const TOKEN: &'static str = "CHIRPER_TOKEN";
    pub const TIMEOUT_SECS: &'static str = "CHIRPER_TIMEOUT_SECS";
}

/// Where and how to reach the backend.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL of the API, always ending in `/` so relative joins keep the path.
    pub base_url: Url,
    /// Bearer token sent with every request, if any.
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

impl ClientSettings {
    /// Settings for the given base URL with no token and the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            auth_token: None,
            request_timeout: NetworkConfig::REQUEST_TIMEOUT,
        })
    }

    /// Attach a bearer token. Blank tokens are treated as absent.
    pub fn with_token(mut self, token: Option<impl Into<String>>) -> Self {
        self.auth_token = token.map(Into::into).filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load settings from `CHIRPER_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(EnvVars::BASE_URL).unwrap_or_else(|_| {
            info!(
                "{} not set, using default: {}",
                EnvVars::BASE_URL,
                NetworkConfig::DEFAULT_BASE_URL
            );
            NetworkConfig::DEFAULT_BASE_URL.to_string()
        });

        let token = env::var(EnvVars::TOKEN).ok();
        if token.is_none() {
            debug!("{} not set, requests will be anonymous", EnvVars::TOKEN);
        }

        let timeout = match env::var(EnvVars::TIMEOUT_SECS) {
            Ok(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| ChirperError::Config {
                    message: format!("Invalid {} value '{}': {}", EnvVars::TIMEOUT_SECS, raw, e),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => NetworkConfig::REQUEST_TIMEOUT,
        };

        Ok(Self::new(&base_url)?.with_token(token).with_timeout(timeout))
    }
}

/// Parse a base URL and make sure its path ends with a slash.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ChirperError::Config {
            message: format!("Base URL must be http(s): {}", raw),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
