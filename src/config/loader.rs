//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::LoggerConfig;
use crate::config::validation::{
    normalize_config, validate_config, ConfigWarning, ValidationError,
};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides, normalize and validate.
///
/// Warnings are returned rather than logged; the caller logs them once the
/// subscriber built from this config is installed.
pub fn load_config(
    path: Option<&Path>,
) -> Result<(LoggerConfig, Vec<ConfigWarning>), ConfigError> {
    let config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => LoggerConfig::default(),
    };
    finish(config, |key| std::env::var(key).ok())
}

/// Overlay `SERVICE_NAME`, `APP_ENV`, `LOG_LEVEL` and `LOG_FORMAT`.
pub fn apply_env_overrides(
    config: &mut LoggerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    if let Some(service) = lookup("SERVICE_NAME") {
        config.service = service;
    }
    if let Some(env) = lookup("APP_ENV") {
        config.environment = env;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.level = Some(level);
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        match format.parse() {
            Ok(format) => config.format = Some(format),
            Err(e) => warnings.push(ConfigWarning::IgnoredFormat(e)),
        }
    }
    warnings
}

pub(crate) fn finish(
    mut config: LoggerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(LoggerConfig, Vec<ConfigWarning>), ConfigError> {
    let mut warnings = apply_env_overrides(&mut config, lookup);
    warnings.extend(normalize_config(&mut config));
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok((config, warnings))
}
