// ABOUTME: Sliding-window rate limiter for request admission.
// ABOUTME: Allows bursts up to the window ceiling, rejects with a retry hint.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Delay suggested when a rejection has no recorded admission to anchor on.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Reject { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allow)
    }
}

/// Sliding-window counter over recent admissions.
///
/// Up to `max_in_window` admissions are permitted within any interval of
/// length `window`. Timestamps older than the window are pruned lazily on
/// each check. The limiter is owned by a single agent and is not shared
/// across processes.
#[derive(Debug)]
pub struct RateLimiter {
    admitted: VecDeque<Instant>,
    window: Duration,
    max_in_window: usize,
}

impl RateLimiter {
    /// Create a new sliding-window rate limiter.
    ///
    /// # Arguments
    ///
    /// * `max_in_window` - Admissions allowed within one window.
    /// * `window` - Length of the trailing window.
    pub fn new(max_in_window: usize, window: Duration) -> Self {
        Self {
            admitted: VecDeque::with_capacity(max_in_window),
            window,
            max_in_window,
        }
    }

    /// Check whether a request arriving at `now` may proceed.
    ///
    /// On `Allow` the admission is recorded. On `Reject` the retry hint is
    /// the time until the oldest recorded admission leaves the window.
    pub fn admit(&mut self, now: Instant) -> Admission {
        self.prune(now);

        if self.admitted.len() < self.max_in_window {
            self.admitted.push_back(now);
            return Admission::Allow;
        }

        let retry_after = match self.admitted.iter().min() {
            Some(oldest) => (*oldest + self.window).saturating_duration_since(now),
            None => DEFAULT_RETRY_AFTER,
        };

        Admission::Reject { retry_after }
    }

    /// Number of admissions still inside the window at `now`.
    pub fn in_window(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.admitted.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_in_window(&self) -> usize {
        self.max_in_window
    }

    fn prune(&mut self, now: Instant) {
        // Keep timestamps strictly greater than now - window.
        while let Some(front) = self.admitted.front() {
            if now.saturating_duration_since(*front) >= self.window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
    }
}
