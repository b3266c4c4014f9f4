//! Application configuration module
//!
//! Configuration is assembled from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file named by `PULSECHAT_CONFIG`
//! 3. Environment variables (`.env` is loaded by the binary beforehand)
//!
//! `JWT_SECRET` has no default; startup fails without it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the optional TOML config file
pub const CONFIG_PATH_VAR: &str = "PULSECHAT_CONFIG";

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 90;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
const DEFAULT_PRESENCE_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_CONNECTION_BUFFER: usize = 64;
const DEFAULT_STATIC_DIR: &str = "frontend/dist";

/// Dev origins allowed by CORS when no `CLIENT_ORIGIN` is set
pub const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

/// Deployment environment (`NODE_ENV`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// Postgres URL; database features are disabled without it
    pub database_url: Option<String>,
    /// Allowed CORS origin in production
    pub client_origin: Option<String>,
    /// Per-connection delivery timeout during fan-out
    pub delivery_timeout: Duration,
    /// Connections silent for longer than this are evicted
    pub idle_timeout: Duration,
    /// How often the idle sweeper runs
    pub sweep_interval: Duration,
    /// Buffer of the presence event channel (drop-oldest when full)
    pub presence_channel_capacity: usize,
    /// Outbound frame buffer per connection
    pub connection_buffer: usize,
    /// Built frontend served in production
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load from the process environment (and the optional TOML file)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = match lookup(CONFIG_PATH_VAR) {
            Some(path) => AppConfigBuilder::from_file(Path::new(&path))?,
            None => AppConfigBuilder::default(),
        };

        if let Some(port) = lookup("PORT") {
            builder.port = Some(parse_var("PORT", &port)?);
        }
        if let Some(env) = lookup("NODE_ENV") {
            builder.environment = Some(Environment::parse(&env));
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            builder.jwt_secret = Some(secret);
        }
        if let Some(url) = lookup("DATABASE_URL") {
            builder.database_url = Some(url);
        }
        if let Some(origin) = lookup("CLIENT_ORIGIN") {
            builder.client_origin = Some(origin);
        }
        if let Some(ms) = lookup("DELIVERY_TIMEOUT_MS") {
            builder.delivery_timeout = Some(Duration::from_millis(parse_var("DELIVERY_TIMEOUT_MS", &ms)?));
        }
        if let Some(secs) = lookup("IDLE_TIMEOUT_SECS") {
            builder.idle_timeout = Some(Duration::from_secs(parse_var("IDLE_TIMEOUT_SECS", &secs)?));
        }
        if let Some(secs) = lookup("SWEEP_INTERVAL_SECS") {
            builder.sweep_interval = Some(Duration::from_secs(parse_var("SWEEP_INTERVAL_SECS", &secs)?));
        }
        if let Some(cap) = lookup("PRESENCE_CHANNEL_CAPACITY") {
            builder.presence_channel_capacity = Some(parse_var("PRESENCE_CHANNEL_CAPACITY", &cap)?);
        }
        if let Some(buf) = lookup("CONNECTION_BUFFER") {
            builder.connection_buffer = Some(parse_var("CONNECTION_BUFFER", &buf)?);
        }
        if let Some(dir) = lookup("STATIC_DIR") {
            builder.static_dir = Some(PathBuf::from(dir));
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.delivery_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "DELIVERY_TIMEOUT_MS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.idle_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "IDLE_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "SWEEP_INTERVAL_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.presence_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PRESENCE_CHANNEL_CAPACITY",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.connection_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CONNECTION_BUFFER",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Origins the CORS layer should accept
    pub fn allowed_origins(&self) -> Vec<String> {
        match (&self.environment, &self.client_origin) {
            (_, Some(origin)) => vec![origin.clone()],
            (Environment::Development, None) => DEV_ORIGINS.iter().map(|o| o.to_string()).collect(),
            (Environment::Production, None) => Vec::new(),
        }
    }
}

/// Builder for AppConfig
///
/// Every field is optional; `build` fills in defaults and validates.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfigBuilder {
    port: Option<u16>,
    #[serde(deserialize_with = "deserialize_environment")]
    environment: Option<Environment>,
    jwt_secret: Option<String>,
    database_url: Option<String>,
    client_origin: Option<String>,
    #[serde(rename = "delivery_timeout_ms", deserialize_with = "deserialize_millis")]
    delivery_timeout: Option<Duration>,
    #[serde(rename = "idle_timeout_secs", deserialize_with = "deserialize_secs")]
    idle_timeout: Option<Duration>,
    #[serde(rename = "sweep_interval_secs", deserialize_with = "deserialize_secs")]
    sweep_interval: Option<Duration>,
    presence_channel_capacity: Option<usize>,
    connection_buffer: Option<usize>,
    static_dir: Option<PathBuf>,
}

impl AppConfigBuilder {
    /// Read builder values from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::File { reason, .. } => ConfigError::File {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse builder values from TOML text
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::File {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn client_origin(mut self, origin: impl Into<String>) -> Self {
        self.client_origin = Some(origin.into());
        self
    }

    pub fn delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = Some(timeout);
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    pub fn presence_channel_capacity(mut self, capacity: usize) -> Self {
        self.presence_channel_capacity = Some(capacity);
        self
    }

    pub fn connection_buffer(mut self, buffer: usize) -> Self {
        self.connection_buffer = Some(buffer);
        self
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            port: self.port.unwrap_or(DEFAULT_PORT),
            environment: self.environment.unwrap_or_default(),
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("JWT_SECRET"))?,
            database_url: self.database_url.filter(|url| !url.trim().is_empty()),
            client_origin: self.client_origin.filter(|origin| !origin.trim().is_empty()),
            delivery_timeout: self
                .delivery_timeout
                .unwrap_or(Duration::from_millis(DEFAULT_DELIVERY_TIMEOUT_MS)),
            idle_timeout: self
                .idle_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
            sweep_interval: self
                .sweep_interval
                .unwrap_or(Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)),
            presence_channel_capacity: self
                .presence_channel_capacity
                .unwrap_or(DEFAULT_PRESENCE_CHANNEL_CAPACITY),
            connection_buffer: self.connection_buffer.unwrap_or(DEFAULT_CONNECTION_BUFFER),
            static_dir: self
                .static_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })
}

fn deserialize_environment<'de, D>(deserializer: D) -> Result<Option<Environment>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(|s| Environment::parse(&s)))
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("failed to read config file {path}: {reason}")]
    File { path: String, reason: String },
}
