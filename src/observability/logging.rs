//! Structured logging setup.
//!
//! # Responsibilities
//! - Compose the subscriber: level filter, rate-limit gate, context formatter
//! - Install it as the global default
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - JSON in production, text in development, overridable via config

use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggerConfig;
use crate::observability::format::ContextFormat;
use crate::observability::gate::RateLimitLayer;
use crate::observability::LoggingError;
use crate::security::RateLimiter;

/// Build the subscriber stack without installing it.
pub fn build_subscriber<W>(
    config: &LoggerConfig,
    filter: EnvFilter,
    limiter: Arc<RateLimiter>,
    writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter)
        .with(RateLimitLayer::new(limiter))
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(ContextFormat::new(config))
                .with_writer(writer),
        )
}

/// Install the global subscriber writing to stdout through the global limiter.
pub fn init_logging(config: &LoggerConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_level()));

    build_subscriber(config, filter, RateLimiter::global(), std::io::stdout).try_init()?;

    tracing::info!(
        service = %config.service,
        environment = %config.environment,
        level = config.effective_level(),
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use crate::context::{scope, LoggingContext};
    use crate::observability::testing::Capture;
    use crate::security::rate_limit::RateLimitConfig;
    use tracing::instrument::WithSubscriber;

    #[tokio::test]
    async fn test_level_filter_and_context() {
        let config = LoggerConfig {
            service: "edge".into(),
            format: Some(LogFormat::Json),
            ..LoggerConfig::default()
        };
        let capture = Capture::default();
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
        let subscriber = build_subscriber(&config, EnvFilter::new("info"), limiter.clone(), capture.clone());

        scope(LoggingContext::new().with_request_id("R1"), async {
            tracing::debug!("filtered out");
            tokio::task::yield_now().await;
            tracing::info!("kept");
        })
        .with_subscriber(subscriber)
        .await;

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(r#""requestId":"R1""#));
        assert_eq!(limiter.state().count, 1);
    }
}
