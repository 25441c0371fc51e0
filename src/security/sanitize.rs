//! Log-injection guards for values that end up in log lines.

use uuid::Uuid;

use crate::context::LoggingContext;

const MAX_SERVICE_NAME_LEN: usize = 100;

/// Escape control characters that could forge extra log lines.
pub fn sanitize_for_logging(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}

fn is_hyphenated_uuid(s: &str) -> bool {
    s.len() == 36 && Uuid::try_parse(s).is_ok()
}

/// Keep only well-formed, sanitized well-known keys.
///
/// Trace and operation ids must be hyphenated UUIDs; other ids are free-form.
/// Empty values and extra keys are dropped.
pub fn validate_logging_context(ctx: &LoggingContext) -> LoggingContext {
    let uuid_field = |v: &Option<String>| {
        v.as_deref()
            .filter(|s| is_hyphenated_uuid(s))
            .map(sanitize_for_logging)
    };
    let free_field = |v: &Option<String>| {
        v.as_deref()
            .filter(|s| !s.is_empty())
            .map(sanitize_for_logging)
    };

    LoggingContext {
        trace_id: uuid_field(&ctx.trace_id),
        request_id: free_field(&ctx.request_id),
        operation_id: uuid_field(&ctx.operation_id),
        device_id: free_field(&ctx.device_id),
        user_id: free_field(&ctx.user_id),
        extra: Default::default(),
    }
}

/// Trimmed, truncated, sanitized service name; `None` if blank.
pub fn validate_service_name(service: &str) -> Option<String> {
    let trimmed = service.trim();
    if trimmed.is_empty() {
        return None;
    }
    let truncated: String = trimmed.chars().take(MAX_SERVICE_NAME_LEN).collect();
    Some(sanitize_for_logging(&truncated))
}

/// Map a level name onto a tracing level, falling back to `info`.
pub fn validate_log_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" | "alert" => "error",
        "warn" => "warn",
        "http" | "verbose" | "debug" => "debug",
        "silly" | "trace" => "trace",
        _ => "info",
    }
}
