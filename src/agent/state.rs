// ABOUTME: AgentState - everything an agent owns, mutated only by its loop.
// ABOUTME: Implements intake, promotion, completion and the query answers.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::message::{Completion, Notification, RequestStatus, ToolRequest};
use crate::admission::{Admission, RateLimiter};
use crate::cache::ResultCache;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::hook::AgentHooks;
use crate::metrics::{Metrics, MetricsReport};
use crate::queue::{CancelOutcome, Request, RequestTracker};

/// Where an inbound tool request ended up after intake.
#[derive(Debug, Clone, PartialEq)]
pub enum Intake {
    /// Failed validation, rate limiting, or id uniqueness. Terminal.
    Rejected {
        request_id: String,
        error: AgentError,
    },
    /// Answered from cache. Terminal; never queued.
    CacheHit { request_id: String, result: Value },
    /// Waiting for promotion at `position`.
    Queued { request_id: String, position: usize },
}

impl Intake {
    pub fn request_id(&self) -> &str {
        match self {
            Intake::Rejected { request_id, .. }
            | Intake::CacheHit { request_id, .. }
            | Intake::Queued { request_id, .. } => request_id,
        }
    }
}

/// Single owned state of one agent.
#[derive(Debug)]
pub struct AgentState {
    tool: String,
    limiter: RateLimiter,
    cache: ResultCache,
    tracker: RequestTracker,
    metrics: Metrics,
}

impl AgentState {
    pub fn new(tool: impl Into<String>, config: &AgentConfig) -> Self {
        Self {
            tool: tool.into(),
            limiter: RateLimiter::new(config.rate_limit_max, config.rate_limit_window()),
            cache: ResultCache::new(config.cache_ttl(), config.cache_max_entries),
            tracker: RequestTracker::new(config.max_concurrent),
            metrics: Metrics::new(),
        }
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Run a new request through validation, rate limiting and the cache.
    ///
    /// Validation and the duplicate-id check run first so rejected requests
    /// never take a rate-limit slot. Requests surviving every gate are queued.
    pub fn intake(&mut self, req: ToolRequest, hooks: &dyn AgentHooks, now: Instant) -> Intake {
        let request_id = req
            .request_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Err(reason) = hooks.validate(&req.params) {
            debug!(request_id = %request_id, reason = %reason, "validation failed");
            return Intake::Rejected {
                request_id,
                error: AgentError::ValidationFailed(reason),
            };
        }

        if self.tracker.contains(&request_id) {
            debug!(request_id = %request_id, "duplicate request id");
            return Intake::Rejected {
                error: AgentError::DuplicateRequest(request_id.clone()),
                request_id,
            };
        }

        if let Admission::Reject { retry_after } = self.limiter.admit(now) {
            warn!(
                request_id = %request_id,
                retry_after_ms = retry_after.as_millis() as u64,
                "rate limited"
            );
            return Intake::Rejected {
                request_id,
                error: AgentError::RateLimited { retry_after },
            };
        }

        let cache_key = req
            .cache_key
            .or_else(|| hooks.cache_key(&self.tool, &req.params));

        if let Some(key) = cache_key.as_deref() {
            if let Some(result) = self.cache.get(key, now) {
                debug!(request_id = %request_id, "cache hit");
                self.metrics.record_cache_hit(Utc::now());
                return Intake::CacheHit { request_id, result };
            }
        }

        let request = Request {
            id: request_id.clone(),
            params: req.params,
            priority: req.priority,
            cache_key,
            created_at: now,
            cancelled: false,
        };

        match self.tracker.enqueue(request) {
            Ok(position) => {
                debug!(request_id = %request_id, priority = %req.priority, position, "queued");
                Intake::Queued {
                    request_id,
                    position,
                }
            }
            Err(error) => Intake::Rejected { request_id, error },
        }
    }

    /// Promote the next queued request if the active set has room.
    pub fn next_dispatch(&mut self) -> Option<Request> {
        self.tracker.promote()
    }

    /// Apply an execution outcome and build its terminal notification.
    ///
    /// Returns `None` for completions of requests no longer tracked.
    pub(crate) fn complete(&mut self, done: Completion, now: Instant) -> Option<Notification> {
        let Some(request) = self.tracker.complete(&done.request_id) else {
            warn!(request_id = %done.request_id, "completion for unknown request");
            return None;
        };

        let elapsed_ms = done.elapsed.as_millis() as u64;
        let notification = match done.outcome {
            Ok(result) => {
                if let Some(key) = request.cache_key.as_deref() {
                    self.cache.put(key, result.clone(), now);
                }
                self.metrics.record_success(done.elapsed, Utc::now());
                info!(
                    request_id = %request.id,
                    elapsed_ms,
                    cancelled = request.cancelled,
                    "request completed"
                );
                Notification::result(request.id, result, done.elapsed, false, request.cancelled)
            }
            Err(reason) => {
                self.metrics.record_failure(Utc::now());
                warn!(
                    request_id = %request.id,
                    elapsed_ms,
                    reason = %reason,
                    "request failed"
                );
                Notification::error(
                    Some(request.id),
                    &AgentError::ExecutionFailed(reason),
                    request.cancelled,
                )
            }
        };

        Some(notification)
    }

    /// Cancel a queued or in-flight request.
    pub fn cancel(&mut self, request_id: &str) -> Notification {
        match self.tracker.cancel(request_id) {
            CancelOutcome::Dequeued(request) => {
                info!(request_id = %request.id, "cancelled before dispatch");
                Notification::progress(request.id, RequestStatus::Cancelled)
            }
            CancelOutcome::Flagged => {
                info!(request_id = %request_id, "cancel requested for running request");
                Notification::progress(request_id, RequestStatus::CancelRequested)
            }
            CancelOutcome::NotFound => Notification::error(
                Some(request_id.to_string()),
                &AgentError::NotFound(request_id.to_string()),
                false,
            ),
        }
    }

    /// Apply an execution that ran outside the queue.
    pub fn record_batch_item(&mut self, success: bool, elapsed: Duration) {
        if success {
            self.metrics.record_success(elapsed, Utc::now());
        } else {
            self.metrics.record_failure(Utc::now());
        }
    }

    pub fn metrics_report(&self) -> MetricsReport {
        self.metrics.report(
            &self.tool,
            self.cache.len(),
            self.tracker.queue_len(),
            self.tracker.active_count(),
        )
    }

    pub fn clear_cache(&mut self) -> Notification {
        let entries = self.cache.clear();
        info!(entries, "cache cleared");
        Notification::CacheCleared {
            cleared_at: Utc::now(),
            entries,
        }
    }

    /// Drop expired cache entries.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        self.cache.purge_expired(now)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    pub fn is_idle(&self) -> bool {
        self.tracker.is_idle()
    }
}
