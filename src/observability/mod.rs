//! Observability subsystem: the logger facade over `tracing`.
//!
//! # Data Flow
//! ```text
//! tracing::info!(...) anywhere in a unit of work
//!     → EnvFilter (level)
//!     → gate.rs (global fixed-window limiter, silent drop + metric)
//!     → format.rs (service/host/env + current context → text or JSON)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Context is read at format time, so call sites never pass ids around
//! - Dropped events are counted, never surfaced to the caller

use thiserror::Error;

pub mod format;
pub mod gate;
pub mod logging;
pub mod metrics;

pub use format::ContextFormat;
pub use gate::RateLimitLayer;
pub use logging::{build_subscriber, init_logging};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),

    #[error("failed to install metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}
