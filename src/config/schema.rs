//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! every field has a default, so an empty file is a valid config.

use serde::{Deserialize, Serialize};

pub const DEVELOPMENT: &str = "development";
pub const PRODUCTION: &str = "production";

/// Root configuration for a context-aware logger.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Service name stamped on every record.
    pub service: String,

    /// Deployment environment (development, staging, production, ...).
    pub environment: String,

    /// Log level; derived from the environment when unset.
    pub level: Option<String>,

    /// Output format; derived from the environment when unset.
    pub format: Option<LogFormat>,

    /// HTTP access logging.
    pub http: HttpLoggingConfig,

    /// Metrics exporter.
    pub metrics: MetricsConfig,

    /// Demo server settings.
    pub server: ServerConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            service: "default".to_string(),
            environment: DEVELOPMENT.to_string(),
            level: None,
            format: None,
            http: HttpLoggingConfig::default(),
            metrics: MetricsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl LoggerConfig {
    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }

    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Configured level, or `debug` in development and `info` elsewhere.
    pub fn effective_level(&self) -> &str {
        match &self.level {
            Some(level) => level.as_str(),
            None if self.is_development() => "debug",
            None => "info",
        }
    }

    /// Configured format, or text in development and JSON elsewhere.
    pub fn effective_format(&self) -> LogFormat {
        self.format.unwrap_or(if self.is_development() {
            LogFormat::Text
        } else {
            LogFormat::Json
        })
    }
}

/// Rendering of log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single line.
    Text,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// HTTP access logging.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpLoggingConfig {
    /// Disable the middleware entirely (no context, no access log).
    pub skip_logging: bool,

    /// Only log 401/403 responses, at warn level. Production only.
    pub log_only_auth_errors: bool,
}

/// Prometheus exporter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,

    /// Exporter bind address.
    pub address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Demo server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}
