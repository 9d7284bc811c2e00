// ABOUTME: Batch fan-out - runs many independent tool calls with bounded concurrency.
// ABOUTME: Per-item failures and timeouts are captured; results keep input order.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::{FutureExt, StreamExt, stream};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::message::Envelope;
use crate::error::AgentError;
use crate::hook::{AgentHooks, guarded_post_process};
use crate::tool::ToolExecutor;

/// Outcome of one batch item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchItemResult {
    Success {
        result: Value,
        execution_time_ms: u64,
    },
    Failure {
        error: String,
        reason: String,
    },
}

impl BatchItemResult {
    fn failure(error: &AgentError) -> Self {
        BatchItemResult::Failure {
            error: error.kind().to_string(),
            reason: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchItemResult::Success { .. })
    }
}

/// Aggregate of a batch run. `results[i]` belongs to input item `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
    pub elapsed_ms: u64,
}

/// Issues batch items straight to the executor, outside the agent's queue
/// and rate limiter.
pub struct BatchRunner {
    tool: String,
    executor: Arc<dyn ToolExecutor>,
    hooks: Arc<dyn AgentHooks>,
    concurrency: usize,
    item_timeout: Duration,
    /// Owning agent, told about each executed item for its metrics.
    agent: Option<mpsc::Sender<Envelope>>,
}

impl BatchRunner {
    pub fn new(
        tool: impl Into<String>,
        executor: Arc<dyn ToolExecutor>,
        hooks: Arc<dyn AgentHooks>,
        concurrency: usize,
        item_timeout: Duration,
    ) -> Self {
        Self {
            tool: tool.into(),
            executor,
            hooks,
            concurrency: concurrency.max(1),
            item_timeout,
            agent: None,
        }
    }

    pub(crate) fn reporting_to(mut self, agent: mpsc::Sender<Envelope>) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Run every item and collect the results in input order.
    ///
    /// With `parallel`, up to `concurrency` items are in flight at once;
    /// otherwise each item finishes before the next starts.
    pub async fn run(&self, items: Vec<Value>, parallel: bool) -> BatchReport {
        let started = Instant::now();
        let total = items.len();

        let results: Vec<BatchItemResult> = if parallel {
            stream::iter(items.into_iter().map(|item| self.run_item(item)))
                .buffered(self.concurrency)
                .collect()
                .await
        } else {
            let mut results = Vec::with_capacity(total);
            for item in items {
                results.push(self.run_item(item).await);
            }
            results
        };

        let successful = results.iter().filter(|r| r.is_success()).count();
        let report = BatchReport {
            total,
            successful,
            failed: total - successful,
            results,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            tool = %self.tool,
            total = report.total,
            successful = report.successful,
            failed = report.failed,
            parallel,
            elapsed_ms = report.elapsed_ms,
            "batch finished"
        );

        report
    }

    async fn run_item(&self, params: Value) -> BatchItemResult {
        if let Err(reason) = self.hooks.validate(&params) {
            return BatchItemResult::failure(&AgentError::ValidationFailed(reason));
        }

        let started = Instant::now();
        let call = AssertUnwindSafe(self.executor.execute(
            &self.tool,
            params.clone(),
            self.item_timeout,
        ))
        .catch_unwind();

        let outcome = match tokio::time::timeout(self.item_timeout, call).await {
            Err(_) => Err(AgentError::Timeout(self.item_timeout)),
            Ok(Err(_)) => Err(AgentError::ExecutionFailed("executor panicked".into())),
            Ok(Ok(Err(e))) => Err(AgentError::ExecutionFailed(format!("{:#}", e))),
            Ok(Ok(Ok(value))) => guarded_post_process(self.hooks.as_ref(), &params, value)
                .map_err(AgentError::ExecutionFailed),
        };
        let elapsed = started.elapsed();

        if let Some(agent) = &self.agent {
            let _ = agent
                .send(Envelope::BatchSettled {
                    success: outcome.is_ok(),
                    elapsed,
                })
                .await;
        }

        match outcome {
            Ok(result) => BatchItemResult::Success {
                result,
                execution_time_ms: elapsed.as_millis() as u64,
            },
            Err(error) => {
                debug!(tool = %self.tool, error = %error, "batch item failed");
                BatchItemResult::failure(&error)
            }
        }
    }
}
