// ABOUTME: Queue module - pending and in-flight request bookkeeping.
// ABOUTME: Priority queue, active set, and the tracker that promotes between them.

mod active;
mod pending;
mod request;
mod tracker;

pub use active::ActiveSet;
pub use pending::RequestQueue;
pub use request::{Priority, Request};
pub use tracker::{CancelOutcome, RequestTracker};

#[cfg(test)]
mod tracker_test;
