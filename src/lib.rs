//! Request-scoped contextual logging.
//!
//! Attach correlation ids to a unit of work once and every `tracing` event
//! emitted inside it carries them, with a fixed-window rate limiter guarding
//! the pipeline against log storms.

pub mod config;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::LoggerConfig;
pub use context::{
    clear_context, generate_trace_id, get_context, set_context, with_operation_context,
    LoggingContext,
};
pub use observability::init_logging;
pub use security::{check_rate_limit, reset_rate_limit};
