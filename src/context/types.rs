//! Logging context property bag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TRACE_ID: &str = "traceId";
pub const REQUEST_ID: &str = "requestId";
pub const OPERATION_ID: &str = "operationId";
pub const DEVICE_ID: &str = "deviceId";
pub const USER_ID: &str = "userId";

/// Correlation identifiers attached to every record of a unit of work.
///
/// Five well-known keys get their own fields; anything else lands in
/// `extra` and is forwarded to the log backend as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl LoggingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    pub fn with_device_id(mut self, id: impl Into<String>) -> Self {
        self.device_id = Some(id.into());
        self
    }

    pub fn with_user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    /// Builder form of [`LoggingContext::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a key by name. Well-known keys are routed to their fields.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = Some(value.into());
        match key.as_str() {
            TRACE_ID => self.trace_id = value,
            REQUEST_ID => self.request_id = value,
            OPERATION_ID => self.operation_id = value,
            DEVICE_ID => self.device_id = value,
            USER_ID => self.user_id = value,
            _ => {
                self.extra.insert(key, value.unwrap_or_default());
            }
        }
    }

    /// Look up a key by name, well-known or extra.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            TRACE_ID => self.trace_id.as_deref(),
            REQUEST_ID => self.request_id.as_deref(),
            OPERATION_ID => self.operation_id.as_deref(),
            DEVICE_ID => self.device_id.as_deref(),
            USER_ID => self.user_id.as_deref(),
            other => self.extra.get(other).map(String::as_str),
        }
    }

    /// Shallow merge: every key present in `other` overwrites ours.
    pub fn merge(&mut self, other: LoggingContext) {
        let LoggingContext {
            trace_id,
            request_id,
            operation_id,
            device_id,
            user_id,
            extra,
        } = other;

        overwrite(&mut self.trace_id, trace_id);
        overwrite(&mut self.request_id, request_id);
        overwrite(&mut self.operation_id, operation_id);
        overwrite(&mut self.device_id, device_id);
        overwrite(&mut self.user_id, user_id);
        self.extra.extend(extra);
    }

    pub fn is_empty(&self) -> bool {
        self.trace_id.is_none()
            && self.request_id.is_none()
            && self.operation_id.is_none()
            && self.device_id.is_none()
            && self.user_id.is_none()
            && self.extra.is_empty()
    }

    /// All present keys in a stable order: well-known first, then extras.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let known = [
            (TRACE_ID, &self.trace_id),
            (REQUEST_ID, &self.request_id),
            (OPERATION_ID, &self.operation_id),
            (DEVICE_ID, &self.device_id),
            (USER_ID, &self.user_id),
        ];
        known
            .into_iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

fn overwrite(slot: &mut Option<String>, incoming: Option<String>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}
