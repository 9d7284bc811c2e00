// ABOUTME: AgentHandle - the cloneable front door to a running agent.
// ABOUTME: Sends signals, awaits results and queries, and runs batches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::batch::{BatchReport, BatchRunner};
use super::message::{Envelope, Notification, Signal, ToolRequest};
use crate::error::AgentError;
use crate::metrics::MetricsReport;
use crate::queue::Priority;

/// Handle to a spawned agent. Cheap to clone; the agent drains and stops
/// once every clone is dropped.
#[derive(Clone)]
pub struct AgentHandle {
    tool: Arc<str>,
    mailbox: mpsc::Sender<Envelope>,
    batch: Arc<BatchRunner>,
}

impl AgentHandle {
    pub(crate) fn new(tool: String, mailbox: mpsc::Sender<Envelope>, batch: BatchRunner) -> Self {
        Self {
            tool: tool.into(),
            mailbox,
            batch: Arc::new(batch),
        }
    }

    /// Identifier of the tool this agent wraps.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Deliver a raw signal. Responses arrive on the notification stream.
    pub async fn send(&self, signal: Signal) -> Result<(), AgentError> {
        self.deliver(signal, None).await
    }

    /// Submit a request, returning its id without waiting for the outcome.
    pub async fn submit(&self, request: ToolRequest) -> Result<String, AgentError> {
        let request = ensure_id(request);
        let id = request.request_id.clone().unwrap_or_default();
        self.send(Signal::ToolRequest(request)).await?;
        Ok(id)
    }

    /// Submit `params` at `priority` and wait for the terminal notification.
    pub async fn call(&self, params: Value, priority: Priority) -> Result<Notification, AgentError> {
        self.call_request(ToolRequest::new(params).with_priority(priority))
            .await
    }

    /// Submit a request and wait for its terminal notification: a result,
    /// an error, or a cancelled progress update.
    pub async fn call_request(&self, request: ToolRequest) -> Result<Notification, AgentError> {
        self.ask(Signal::ToolRequest(ensure_id(request))).await
    }

    /// Cancel a queued or running request. The outcome is emitted on the
    /// notification stream.
    pub async fn cancel(&self, request_id: impl Into<String>) -> Result<(), AgentError> {
        self.send(Signal::CancelRequest {
            request_id: request_id.into(),
        })
        .await
    }

    /// Current metrics and gauges.
    pub async fn metrics(&self) -> Result<MetricsReport, AgentError> {
        match self.ask(Signal::GetMetrics).await? {
            Notification::MetricsReport(report) => Ok(report),
            _ => Err(AgentError::Unhandled("get_metrics".into())),
        }
    }

    /// Empty the result cache, returning when it was cleared.
    pub async fn clear_cache(&self) -> Result<DateTime<Utc>, AgentError> {
        match self.ask(Signal::ClearCache).await? {
            Notification::CacheCleared { cleared_at, .. } => Ok(cleared_at),
            _ => Err(AgentError::Unhandled("clear_cache".into())),
        }
    }

    /// Fan `items` out to the tool, bypassing the queue and rate limiter.
    pub async fn run_batch(&self, items: Vec<Value>, parallel: bool) -> BatchReport {
        self.batch.run(items, parallel).await
    }

    async fn ask(&self, signal: Signal) -> Result<Notification, AgentError> {
        let (tx, rx) = oneshot::channel();
        self.deliver(signal, Some(tx)).await?;
        rx.await.map_err(|_| AgentError::AgentStopped)
    }

    async fn deliver(
        &self,
        signal: Signal,
        reply: Option<oneshot::Sender<Notification>>,
    ) -> Result<(), AgentError> {
        self.mailbox
            .send(Envelope::Signal { signal, reply })
            .await
            .map_err(|_| AgentError::AgentStopped)
    }
}

fn ensure_id(mut request: ToolRequest) -> ToolRequest {
    if request.request_id.is_none() {
        request.request_id = Some(Uuid::new_v4().to_string());
    }
    request
}
