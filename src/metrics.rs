// ABOUTME: Running request statistics kept by each agent.
// ABOUTME: Incremental latency mean over executions; cache hits counted apart.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counters updated on every terminal request event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Requests that reached a terminal state through execution or cache.
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub cache_hits: u64,

    /// Mean execution latency over successful executions, in milliseconds.
    pub average_execution_ms: f64,

    pub last_request_at: Option<DateTime<Utc>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful execution taking `elapsed`.
    pub fn record_success(&mut self, elapsed: Duration, at: DateTime<Utc>) {
        self.total += 1;
        self.successful += 1;

        let n = self.successful as f64;
        let sample = elapsed.as_secs_f64() * 1000.0;
        self.average_execution_ms = (self.average_execution_ms * (n - 1.0) + sample) / n;
        self.last_request_at = Some(at);
    }

    /// Record a failed execution. Latency is not sampled.
    pub fn record_failure(&mut self, at: DateTime<Utc>) {
        self.total += 1;
        self.failed += 1;
        self.last_request_at = Some(at);
    }

    /// Record a request answered from cache.
    pub fn record_cache_hit(&mut self, at: DateTime<Utc>) {
        self.total += 1;
        self.cache_hits += 1;
        self.last_request_at = Some(at);
    }

    /// Snapshot with the agent's live gauges.
    pub fn report(
        &self,
        tool: &str,
        cache_size: usize,
        queue_length: usize,
        active_count: usize,
    ) -> MetricsReport {
        MetricsReport {
            tool: tool.to_string(),
            metrics: self.clone(),
            cache_size,
            queue_length,
            active_count,
        }
    }
}

/// Read-only metrics view returned by `get_metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub tool: String,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub cache_size: usize,
    pub queue_length: usize,
    pub active_count: usize,
}
