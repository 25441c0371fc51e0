//! Request-scoped logging context.
//!
//! # Data Flow
//! ```text
//! Unit of work starts (HTTP request, job, ...)
//!     → scope(initial, fut)        fresh slot for this unit
//!     → set_context / with_operation_context   merge into slot
//!     → get_context                 read by the log formatter on every event
//!     → clear_context or scope end  slot dropped
//!
//! Child tasks:
//!     → spawn / propagate           child gets a snapshot, parent unaffected
//! ```
//!
//! # Design Decisions
//! - Slot is a tokio task-local, not a global: interleaved units never share it
//! - Merge is shallow, last write wins per key
//! - Absence of context is a normal state, never an error

pub mod store;
pub mod types;

pub use store::{
    clear_context, generate_trace_id, get_context, propagate, replace_context, scope, set_context,
    spawn, sync_scope, with_operation_context,
};
pub use types::LoggingContext;
