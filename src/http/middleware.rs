//! Per-request context middleware.
//!
//! Opens a context scope for each request seeded with the trace and request
//! ids, echoes both ids back as response headers and writes an access-log
//! event from inside the scope so it carries them too. With logging turned
//! off the request still gets its own, initially empty, scope.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::LoggerConfig;
use crate::context::{self, generate_trace_id, LoggingContext};
use crate::observability::metrics;

pub const X_TRACE_ID: HeaderName = HeaderName::from_static("x-trace-id");
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Access-log behavior of [`context_middleware`].
#[derive(Debug, Clone, Default)]
pub struct HttpLoggerOptions {
    pub skip_logging: bool,
    pub log_only_auth_errors: bool,
    pub production: bool,
}

impl HttpLoggerOptions {
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            skip_logging: config.http.skip_logging,
            log_only_auth_errors: config.http.log_only_auth_errors,
            production: config.is_production(),
        }
    }

    /// Auth-error-only logging is a production feature; elsewhere it turns
    /// the middleware off like `skip_logging`.
    fn passthrough(&self) -> bool {
        self.skip_logging || (self.log_only_auth_errors && !self.production)
    }
}

pub async fn context_middleware(
    State(options): State<HttpLoggerOptions>,
    request: Request,
    next: Next,
) -> Response {
    if options.passthrough() {
        return context::scope(LoggingContext::new(), next.run(request)).await;
    }

    let trace_id = header_or_generate(request.headers(), &X_TRACE_ID);
    let request_id = header_or_generate(request.headers(), &X_REQUEST_ID);
    let initial = LoggingContext::new()
        .with_trace_id(trace_id.clone())
        .with_request_id(request_id.clone());

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let mut response = context::scope(initial, async move {
        let response = next.run(request).await;
        log_access(&options, &method, &path, response.status(), start);
        response
    })
    .await;

    echo_header(response.headers_mut(), X_TRACE_ID, &trace_id);
    echo_header(response.headers_mut(), X_REQUEST_ID, &request_id);
    response
}

fn header_or_generate(headers: &HeaderMap, name: &HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_trace_id)
}

fn echo_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "Correlation id is not a valid header value"),
    }
}

fn log_access(
    options: &HttpLoggerOptions,
    method: &Method,
    path: &str,
    status: StatusCode,
    start: Instant,
) {
    let latency_ms = start.elapsed().as_millis() as u64;
    let code = status.as_u16();
    metrics::record_request(method.as_str(), code, start);

    if options.log_only_auth_errors {
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::warn!(%method, path, status = code, latency_ms, "{method} {path} {code}");
        }
        return;
    }

    if status.is_server_error() {
        tracing::error!(%method, path, status = code, "Error processing request");
    }
    tracing::info!(%method, path, status = code, latency_ms, "{method} {path} {code} - {latency_ms}ms");
}
