//! Fixed-window limiter for log emission.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Emissions accepted per window by the global limiter.
pub const DEFAULT_LIMIT: u32 = 1000;

/// Window length of the global limiter.
pub const DEFAULT_WINDOW_MS: u64 = 1000;

static GLOBAL: LazyLock<Arc<RateLimiter>> =
    LazyLock::new(|| Arc::new(RateLimiter::new(RateLimitConfig::default())));

/// Source of "now" in milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall clock, milliseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Hand-driven clock for tests and simulations.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub limit: u32,
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitState {
    pub window_start_ms: u64,
    pub count: u32,
}

/// Counts accepted emissions per fixed window.
///
/// The window restarts at the first call made `window_ms` or more after the
/// previous start, so a burst right after a rollover gets the full limit.
pub struct RateLimiter {
    state: Mutex<RateLimitState>,
    config: RateLimitConfig,
    clock: Box<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: RateLimitConfig, clock: impl Clock + 'static) -> Self {
        let now = clock.now_ms();
        Self {
            state: Mutex::new(RateLimitState {
                window_start_ms: now,
                count: 0,
            }),
            config,
            clock: Box::new(clock),
        }
    }

    /// Process-wide limiter shared by every logger.
    pub fn global() -> Arc<RateLimiter> {
        GLOBAL.clone()
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Returns `true` if one more emission fits in the current window.
    pub fn check(&self) -> bool {
        let now = self.clock.now_ms();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if now.saturating_sub(state.window_start_ms) >= self.config.window_ms {
            state.count = 0;
            state.window_start_ms = now;
        }

        if state.count < self.config.limit {
            state.count += 1;
            true
        } else {
            false
        }
    }

    /// Start a fresh window at `now_ms`, or at the clock's current time.
    pub fn reset(&self, now_ms: Option<u64>) {
        let now = now_ms.unwrap_or_else(|| self.clock.now_ms());
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = RateLimitState {
            window_start_ms: now,
            count: 0,
        };
    }

    pub fn state(&self) -> RateLimitState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Gate one emission through the global limiter.
pub fn check_rate_limit() -> bool {
    GLOBAL.check()
}

/// Reset the global limiter to a fresh window.
pub fn reset_rate_limit(now_ms: Option<u64>) {
    GLOBAL.reset(now_ms);
}
