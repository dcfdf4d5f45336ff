use crate::aggregator::{DEFAULT_DEADLINE_SECS, DEFAULT_FETCH_TIMEOUT_SECS, Timeouts};
use crate::cache::DEFAULT_TTL_SECS;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_POSTS_PATH: &str = "/assessment/blog/posts";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Provider URL must use http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("Provider endpoint is invalid: {0}")]
    InvalidEndpoint(String),

    #[error("Cache TTL must be greater than 0")]
    InvalidTtl,

    #[error("Timeout `{0}` must be greater than 0")]
    InvalidTimeout(&'static str),
}

/// Aggregator service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for incoming API requests
    #[serde(default)]
    pub listener: Listener,
    /// Remote post provider
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.provider.validate()?;

        if self.cache.ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl);
        }

        if self.aggregation.fetch_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("fetch_timeout_secs"));
        }
        if self.aggregation.deadline_secs == 0 {
            return Err(ValidationError::InvalidTimeout("deadline_secs"));
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 8080,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Base URL of the provider, e.g. `https://api.hatchways.io`
    pub base_url: Url,
    /// Path of the posts endpoint, resolved against `base_url`
    #[serde(default = "default_posts_path")]
    pub path: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

impl ProviderConfig {
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.path)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let scheme = self.base_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ValidationError::UnsupportedScheme(scheme.to_string()));
        }

        self.endpoint()
            .map_err(|e| ValidationError::InvalidEndpoint(e.to_string()))?;

        if self.http_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("http_timeout_secs"));
        }

        Ok(())
    }
}

fn default_posts_path() -> String {
    DEFAULT_POSTS_PATH.to_string()
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// How long a fetched tag is served from the cache
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AggregationConfig {
    pub fetch_timeout_secs: u64,
    pub deadline_secs: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            deadline_secs: DEFAULT_DEADLINE_SECS,
        }
    }
}

impl From<&AggregationConfig> for Timeouts {
    fn from(config: &AggregationConfig) -> Self {
        Timeouts {
            fetch: Duration::from_secs(config.fetch_timeout_secs),
            deadline: Duration::from_secs(config.deadline_secs),
        }
    }
}
