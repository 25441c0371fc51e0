//! Protection for the logging pipeline.
//!
//! # Data Flow
//! ```text
//! Log event:
//!     → rate_limit.rs (fixed-window gate, drop when over budget)
//!     → sanitize.rs (escape control characters before rendering)
//!     → formatter
//! ```
//!
//! # Design Decisions
//! - One global window for the whole process, not per context or level
//! - Rejected events are dropped, never queued
//! - No trust in values supplied by clients (headers, ids)

pub mod rate_limit;
pub mod sanitize;

pub use rate_limit::{check_rate_limit, reset_rate_limit, RateLimiter};
