// ABOUTME: Tracks requests from enqueue through promotion to completion.
// ABOUTME: Promotion only happens while the active set has capacity.

use super::active::ActiveSet;
use super::pending::RequestQueue;
use super::request::Request;
use crate::error::AgentError;

/// What a cancellation did.
#[derive(Debug, Clone)]
pub enum CancelOutcome {
    /// The request was still queued and has been dropped.
    Dequeued(Request),
    /// The request is in flight; it was flagged and will still complete.
    Flagged,
    /// No queued or active request has this id.
    NotFound,
}

/// Queue plus active set, moved between atomically.
#[derive(Debug)]
pub struct RequestTracker {
    queue: RequestQueue,
    active: ActiveSet,
}

impl RequestTracker {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            queue: RequestQueue::new(),
            active: ActiveSet::new(max_concurrent),
        }
    }

    /// Whether `id` is queued or in flight.
    pub fn contains(&self, id: &str) -> bool {
        self.queue.contains(id) || self.active.contains(id)
    }

    /// Queue a request. Rejects ids already queued or in flight.
    pub fn enqueue(&mut self, request: Request) -> Result<usize, AgentError> {
        if self.active.contains(&request.id) {
            return Err(AgentError::DuplicateRequest(request.id));
        }
        self.queue.enqueue(request)
    }

    /// Move the head of the queue into the active set if there is room.
    ///
    /// Returns a copy of the promoted request for dispatch.
    pub fn promote(&mut self) -> Option<Request> {
        if !self.active.has_capacity() {
            return None;
        }
        let request = self.queue.pop()?;
        self.active.insert(request.clone());
        Some(request)
    }

    /// Remove a finished request from the active set.
    pub fn complete(&mut self, id: &str) -> Option<Request> {
        self.active.complete(id)
    }

    pub fn cancel(&mut self, id: &str) -> CancelOutcome {
        if let Some(request) = self.queue.remove(id) {
            return CancelOutcome::Dequeued(request);
        }
        if self.active.flag_cancelled(id) {
            return CancelOutcome::Flagged;
        }
        CancelOutcome::NotFound
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// No queued and no in-flight work.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.active.is_empty()
    }
}
