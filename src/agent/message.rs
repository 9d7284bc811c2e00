// ABOUTME: Inbound signals and outbound notifications exchanged with an agent.
// ABOUTME: Both are closed, serde-tagged enums keyed by a "type" field.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::AgentError;
use crate::metrics::MetricsReport;
use crate::queue::Priority;

/// A request for the agent's tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Caller-chosen id. Generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    pub params: Value,

    #[serde(default)]
    pub priority: Priority,

    /// Overrides the key derived by the agent's hooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

impl ToolRequest {
    pub fn new(params: Value) -> Self {
        Self {
            request_id: None,
            params,
            priority: Priority::Normal,
            cache_key: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }
}

/// Every message kind an agent accepts.
///
/// Unrecognized `type` tags decode to [`Signal::Unknown`] and are answered
/// with an `unhandled` error rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    ToolRequest(ToolRequest),
    CancelRequest { request_id: String },
    GetMetrics,
    ClearCache,
    #[serde(other)]
    Unknown,
}

impl Signal {
    /// Decode a JSON signal.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Signal::ToolRequest(_) => "tool_request",
            Signal::CancelRequest { .. } => "cancel_request",
            Signal::GetMetrics => "get_metrics",
            Signal::ClearCache => "clear_cache",
            Signal::Unknown => "unknown",
        }
    }
}

/// Lifecycle states reported through progress notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Queued,
    Running,
    /// Removed from the queue before dispatch.
    Cancelled,
    /// Flagged while in flight; a result or error still follows.
    CancelRequested,
}

/// Everything an agent reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Progress {
        request_id: String,
        status: RequestStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },

    Result {
        request_id: String,
        result: Value,
        execution_time_ms: u64,
        from_cache: bool,
        cancelled: bool,
    },

    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        kind: String,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry_after_ms: Option<u64>,
        cancelled: bool,
    },

    CacheCleared {
        cleared_at: DateTime<Utc>,
        entries: usize,
    },

    MetricsReport(MetricsReport),
}

impl Notification {
    pub(crate) fn progress(request_id: impl Into<String>, status: RequestStatus) -> Self {
        Notification::Progress {
            request_id: request_id.into(),
            status,
            position: None,
        }
    }

    pub(crate) fn error(request_id: Option<String>, error: &AgentError, cancelled: bool) -> Self {
        Notification::Error {
            request_id,
            kind: error.kind().to_string(),
            error: error.to_string(),
            retry_after_ms: error.retry_after().map(|d| d.as_millis() as u64),
            cancelled,
        }
    }

    pub(crate) fn result(
        request_id: impl Into<String>,
        result: Value,
        execution_time: Duration,
        from_cache: bool,
        cancelled: bool,
    ) -> Self {
        Notification::Result {
            request_id: request_id.into(),
            result,
            execution_time_ms: execution_time.as_millis() as u64,
            from_cache,
            cancelled,
        }
    }

    /// Request this notification is about, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Notification::Progress { request_id, .. } | Notification::Result { request_id, .. } => {
                Some(request_id.as_str())
            }
            Notification::Error { request_id, .. } => request_id.as_deref(),
            Notification::CacheCleared { .. } | Notification::MetricsReport(_) => None,
        }
    }

    /// Whether this is the last notification for its request.
    pub fn is_terminal(&self) -> bool {
        match self {
            Notification::Result { .. } | Notification::Error { .. } => true,
            Notification::Progress { status, .. } => *status == RequestStatus::Cancelled,
            Notification::CacheCleared { .. } | Notification::MetricsReport(_) => false,
        }
    }
}

/// Messages processed by the agent loop.
pub(crate) enum Envelope {
    /// An inbound signal. With `reply`, the direct answer goes there:
    /// the terminal notification for tool requests (also broadcast), the
    /// response itself for every other kind.
    Signal {
        signal: Signal,
        reply: Option<oneshot::Sender<Notification>>,
    },

    /// A batch item finished executing outside the queue.
    BatchSettled { success: bool, elapsed: Duration },
}

/// Outcome of one dispatched execution, delivered back to the agent loop.
#[derive(Debug)]
pub(crate) struct Completion {
    pub request_id: String,
    pub outcome: Result<Value, String>,
    pub elapsed: Duration,
}
