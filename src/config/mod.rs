//! Configuration handling for the service.
//!
//! Everything comes from environment variables with development defaults.
//! Missing rendering credentials are not an error: the `/html-to-image`
//! endpoint reports itself as not configured instead.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::extractor::LocateStrategy;

/// Environment variable names.
pub const ENV_PORT: &str = "PORT";
pub const ENV_HCTI_USER_ID: &str = "HCTI_USER_ID";
pub const ENV_HCTI_API_KEY: &str = "HCTI_API_KEY";
pub const ENV_HCTI_API_URL: &str = "HCTI_API_URL";
pub const ENV_SCRAPE_STRATEGY: &str = "SCRAPE_STRATEGY";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_RENDER_TIMEOUT_SECS: &str = "RENDER_TIMEOUT_SECS";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_HCTI_API_URL: &str = "https://hcti.io/v1/image";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 25;
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

/// Log output flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Basic-auth credentials for the HTML-to-image API.
#[derive(Clone, PartialEq, Eq)]
pub struct HctiCredentials {
    pub user_id: String,
    pub api_key: String,
}

impl std::fmt::Debug for HctiCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HctiCredentials")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    port: u16,
    hcti_credentials: Option<HctiCredentials>,
    hcti_api_url: String,
    scrape_strategy: LocateStrategy,
    fetch_timeout: Duration,
    render_timeout: Duration,
    log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            hcti_credentials: None,
            hcti_api_url: DEFAULT_HCTI_API_URL.to_string(),
            scrape_strategy: LocateStrategy::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            render_timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port: u16 = match non_empty_var(ENV_PORT) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: ENV_PORT,
                reason: format!("'{}' is not a port number", raw),
            })?,
            None => defaults.port,
        };

        let hcti_credentials = match (non_empty_var(ENV_HCTI_USER_ID), non_empty_var(ENV_HCTI_API_KEY)) {
            (Some(user_id), Some(api_key)) => Some(HctiCredentials { user_id, api_key }),
            _ => None,
        };

        let scrape_strategy: LocateStrategy = match non_empty_var(ENV_SCRAPE_STRATEGY) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidValue {
                field: ENV_SCRAPE_STRATEGY,
                reason,
            })?,
            None => defaults.scrape_strategy,
        };

        let log_format = match non_empty_var(ENV_LOG_FORMAT).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            port,
            hcti_credentials,
            hcti_api_url: non_empty_var(ENV_HCTI_API_URL).unwrap_or(defaults.hcti_api_url),
            scrape_strategy,
            fetch_timeout: secs_var(ENV_FETCH_TIMEOUT_SECS)?.unwrap_or(defaults.fetch_timeout),
            render_timeout: secs_var(ENV_RENDER_TIMEOUT_SECS)?.unwrap_or(defaults.render_timeout),
            log_format,
        })
    }

    /// TCP port the HTTP server listens on.
    pub fn port(&self) -> u16 {
        self.port
    }
    /// Bind address on all interfaces.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
    /// Rendering credentials, present only when both values are set.
    pub fn hcti_credentials(&self) -> Option<&HctiCredentials> {
        self.hcti_credentials.as_ref()
    }
    pub fn hcti_api_url(&self) -> &str {
        &self.hcti_api_url
    }
    /// Locator strategy used by `/scrape-blog`.
    pub fn scrape_strategy(&self) -> LocateStrategy {
        self.scrape_strategy
    }
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    pub fn render_timeout(&self) -> Duration {
        self.render_timeout
    }
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn with_hcti_credentials(
        mut self,
        user_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        self.hcti_credentials = Some(HctiCredentials {
            user_id: user_id.into(),
            api_key: api_key.into(),
        });
        self
    }

    pub fn with_hcti_api_url(mut self, url: impl Into<String>) -> Self {
        self.hcti_api_url = url.into();
        self
    }

    pub fn with_scrape_strategy(mut self, strategy: LocateStrategy) -> Self {
        self.scrape_strategy = strategy;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn secs_var(key: &'static str) -> Result<Option<Duration>, ConfigError> {
    non_empty_var(key)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    field: key,
                    reason: format!("'{}' is not a number of seconds", raw),
                })
        })
        .transpose()
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
