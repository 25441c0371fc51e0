//! HTTP boundary.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → middleware.rs (x-trace-id / x-request-id or fresh ids, open context scope)
//!     → handler (logs carry the ids implicitly)
//!     → middleware.rs (access log, echo X-Trace-ID / X-Request-ID)
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{context_middleware, HttpLoggerOptions, X_REQUEST_ID, X_TRACE_ID};
pub use server::build_router;
