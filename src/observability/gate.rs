//! Emission gate backed by the fixed-window rate limiter.

use std::sync::Arc;

use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::observability::metrics;
use crate::security::RateLimiter;

/// Layer that vetoes events once the limiter's window is exhausted.
///
/// Runs after level filtering, so disabled events never consume budget.
/// Vetoed events are dropped for every layer and only counted.
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Arc<RateLimiter>,
}

impl RateLimitLayer {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }

    pub fn global() -> Self {
        Self::new(RateLimiter::global())
    }
}

impl<S: Subscriber> Layer<S> for RateLimitLayer {
    fn event_enabled(&self, event: &Event<'_>, _ctx: Context<'_, S>) -> bool {
        if self.limiter.check() {
            true
        } else {
            metrics::record_log_dropped(event.metadata().level());
            false
        }
    }
}
