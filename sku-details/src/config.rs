use crate::protocol::API_VERSION;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Package name cannot be empty")]
    EmptyPackageName,

    #[error("Unsupported billing API version: {0} (minimum is 3)")]
    UnsupportedApiVersion(u32),

    #[error("Service timeout cannot be 0")]
    InvalidTimeout,

    #[error("Cache capacity cannot be 0 when caching is enabled")]
    InvalidCacheCapacity,
}

/// SKU details configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Package name the application is published under
    pub package_name: String,
    /// Billing API version sent with every call
    #[serde(default = "default_api_version")]
    pub api_version: u32,
    /// Billing service endpoint
    pub service: ServiceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_api_version() -> u32 {
    API_VERSION
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.package_name.is_empty() {
            return Err(ValidationError::EmptyPackageName);
        }

        if self.api_version < API_VERSION {
            return Err(ValidationError::UnsupportedApiVersion(self.api_version));
        }

        self.service.validate()?;
        self.cache.validate()?;

        Ok(())
    }
}

/// Billing service endpoint configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Base URL of the billing service
    pub url: Url,
    /// Timeout of a single batch call. No timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == Some(0) {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Result cache configuration
///
/// Caching is disabled by default: cached details are served until the TTL
/// expires, even if prices changed in the meantime.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Maximum number of cached results
    pub max_capacity: u64,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_capacity: 1000,
            ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.max_capacity == 0 {
            return Err(ValidationError::InvalidCacheCapacity);
        }
        Ok(())
    }
}
