//! Record decoration: every event is rendered with the active context.

use std::fmt::{self, Write as _};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::config::{LogFormat, LoggerConfig};
use crate::context::{get_context, LoggingContext};
use crate::security::sanitize::sanitize_for_logging;

/// Event formatter stamping service metadata and the current context.
#[derive(Debug, Clone)]
pub struct ContextFormat {
    service: String,
    hostname: String,
    environment: String,
    format: LogFormat,
}

impl ContextFormat {
    pub fn new(config: &LoggerConfig) -> Self {
        Self {
            service: config.service.clone(),
            hostname: hostname(),
            environment: config.environment.clone(),
            format: config.effective_format(),
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    fn write_text(
        &self,
        writer: &mut Writer<'_>,
        level: &Level,
        ctx: &LoggingContext,
        fields: FieldCollector,
    ) -> fmt::Result {
        write!(
            writer,
            "{} [{}] {} [trace:{}] [req:{}]",
            Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            self.service,
            level,
            or_dash(&ctx.trace_id),
            or_dash(&ctx.request_id),
        )?;

        let optional = [
            ("op", &ctx.operation_id),
            ("device", &ctx.device_id),
            ("user", &ctx.user_id),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                write!(writer, " [{label}:{}]", sanitize_for_logging(value))?;
            }
        }
        for (key, value) in &ctx.extra {
            write!(
                writer,
                " [{}:{}]",
                sanitize_for_logging(key),
                sanitize_for_logging(value)
            )?;
        }

        write!(writer, ": {}", sanitize_for_logging(&fields.message))?;
        for (key, value) in &fields.fields {
            match value {
                Value::String(s) => write!(writer, " {key}={}", sanitize_for_logging(s))?,
                other => write!(writer, " {key}={other}")?,
            }
        }
        writeln!(writer)
    }

    fn write_json(
        &self,
        writer: &mut Writer<'_>,
        level: &Level,
        target: &str,
        ctx: &LoggingContext,
        fields: FieldCollector,
    ) -> fmt::Result {
        // Record metadata goes in last so context keys cannot overwrite it.
        let mut record: Map<String, Value> = ctx
            .iter()
            .map(|(key, value)| (key.to_string(), value.into()))
            .collect();
        record.extend(fields.fields);
        record.insert(
            "timestamp".into(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true).into(),
        );
        record.insert("level".into(), level.as_str().to_ascii_lowercase().into());
        record.insert("message".into(), fields.message.into());
        record.insert("target".into(), target.into());
        record.insert("service".into(), self.service.clone().into());
        record.insert("hostname".into(), self.hostname.clone().into());
        record.insert("environment".into(), self.environment.clone().into());

        writeln!(writer, "{}", Value::Object(record))
    }
}

impl<S, N> FormatEvent<S, N> for ContextFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let context = get_context();
        let metadata = event.metadata();
        match self.format {
            LogFormat::Text => self.write_text(&mut writer, metadata.level(), &context, fields),
            LogFormat::Json => self.write_json(
                &mut writer,
                metadata.level(),
                metadata.target(),
                &context,
                fields,
            ),
        }
    }
}

fn or_dash(value: &Option<String>) -> String {
    value
        .as_deref()
        .map(sanitize_for_logging)
        .unwrap_or_else(|| "-".to_string())
}

fn hostname() -> String {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|name| !name.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Collects event fields, splitting out `message`.
#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Map<String, Value>,
}

impl FieldCollector {
    fn record(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, value.into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}").into());
    }
}
