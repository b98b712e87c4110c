//! Configuration for the identity service.

use crate::error::IdentityError;
use crate::registry::ServiceInfo;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "IDENTITY";

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding one keystore JSON file per account
    #[serde(default)]
    pub keystore_path: PathBuf,

    /// Listen address in `host:port` form; an empty host binds all interfaces
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// Metadata returned by `/api/v1/info`
    #[serde(default)]
    pub info: InfoConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfoConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_provider_name")]
    pub provider_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Seconds in-flight requests get to finish after a shutdown signal
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute (0 disables limiting)
    #[serde(default)]
    pub requests_per_minute: u32,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            provider_name: default_provider_name(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_http_host() -> String {
    ":8080".into()
}

fn default_version() -> String {
    ServiceInfo::default().version
}

fn default_provider_name() -> String {
    ServiceInfo::default().provider_name
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".into()
}

impl From<InfoConfig> for ServiceInfo {
    fn from(info: InfoConfig) -> Self {
        Self {
            version: info.version,
            provider_name: info.provider_name,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(false)
    }

    /// Build configuration from an explicit environment source.
    pub fn from_environment(environment: config::Environment) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(environment)
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if self.keystore_path.as_os_str().is_empty() {
            return Err(IdentityError::Config(format!(
                "{}_KEYSTORE_PATH must be set",
                ENV_PREFIX
            )));
        }
        self.listen_addr()?;
        Ok(())
    }

    /// Parse `http_host` into a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, IdentityError> {
        let invalid = || IdentityError::Config(format!("invalid http host: {}", self.http_host));

        let (host, port) = self.http_host.rsplit_once(':').ok_or_else(invalid)?;
        let port: u16 = port.parse().map_err(|_| invalid())?;

        let host = host.trim_start_matches('[').trim_end_matches(']');
        let ip = if host.is_empty() {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else if host == "localhost" {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            host.parse().map_err(|_| invalid())?
        };

        Ok(SocketAddr::new(ip, port))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }
}
