//! HTTP server wiring the context middleware in front of a few handlers.
//!
//! # Routes
//! - `GET /health`: liveness probe
//! - `GET /context`: the context visible to the handler, as JSON
//! - `POST /operation`: tags the request with an operation id

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Json},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

use crate::config::LoggerConfig;
use crate::context::{get_context, with_operation_context, LoggingContext};
use crate::http::middleware::{context_middleware, HttpLoggerOptions};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStarted {
    pub operation_id: String,
    pub context: LoggingContext,
}

/// Build the router with the context middleware as the outermost layer.
pub fn build_router(config: &LoggerConfig) -> Router {
    let options = HttpLoggerOptions::from_config(config);

    Router::new()
        .route("/health", get(health))
        .route("/context", get(current_context))
        .route("/operation", post(start_operation))
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn_with_state(options, context_middleware))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(config.server.request_timeout_secs),
                )),
        )
}

/// Serve until the shutdown channel fires.
pub async fn run(
    router: Router,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn health() -> &'static str {
    tracing::debug!("Health check");
    "ok"
}

async fn current_context() -> Json<LoggingContext> {
    Json(get_context())
}

async fn start_operation(Json(data): Json<LoggingContext>) -> Json<OperationStarted> {
    let operation_id = with_operation_context(data);
    tracing::info!("Operation started");

    tokio::task::yield_now().await;

    Json(OperationStarted {
        operation_id,
        context: get_context(),
    })
}
