//! Configuration normalization and validation.
//!
//! Normalization repairs what can be repaired (blank service name, odd level
//! spelling) and reports each repair as a [`ConfigWarning`], since logging is
//! not up yet. Validation then reports every remaining problem at once.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::LoggerConfig;
use crate::security::sanitize::{validate_log_level, validate_service_name};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Something the loader repaired or ignored instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("logger service name not provided, using \"default\"")]
    DefaultServiceName,

    #[error("ignoring LOG_FORMAT: {0}")]
    IgnoredFormat(String),
}

/// Clean up service name and level in place.
pub fn normalize_config(config: &mut LoggerConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    match validate_service_name(&config.service) {
        Some(service) => config.service = service,
        None => {
            warnings.push(ConfigWarning::DefaultServiceName);
            config.service = "default".to_string();
        }
    }

    if let Some(level) = config.level.as_deref() {
        config.level = Some(validate_log_level(level).to_string());
    }

    config.environment = config.environment.trim().to_ascii_lowercase();
    warnings
}

pub fn validate_config(config: &LoggerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.metrics.enabled && config.metrics.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(config.metrics.address.clone()));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
