// ABOUTME: Admission module - gates requests before they reach the queue.
// ABOUTME: Contains the sliding-window rate limiter.

mod rate_limiter;

pub use rate_limiter::{Admission, DEFAULT_RETRY_AFTER, RateLimiter};
