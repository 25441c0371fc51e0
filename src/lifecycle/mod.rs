//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_signal returns
//!
//! Shutdown (shutdown.rs):
//!     trigger → broadcast → server stops accepting → drains → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
