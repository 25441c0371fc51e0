//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (SERVICE_NAME / APP_ENV / LOG_LEVEL / LOG_FORMAT overrides)
//!     → validation.rs (normalize, then semantic checks)
//!     → LoggerConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Level and format follow the environment unless set explicitly
//! - Rate limiter policy is fixed, not part of the config

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use validation::ConfigWarning;
pub use schema::{HttpLoggingConfig, LogFormat, LoggerConfig, MetricsConfig, ServerConfig};
