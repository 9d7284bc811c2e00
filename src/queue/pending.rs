// ABOUTME: Priority-ordered queue of pending requests.
// ABOUTME: Stable within a tier, re-sorted on every insertion.

use super::request::Request;
use crate::error::AgentError;

/// Pending requests ordered High, Normal, Low; arrival order within a tier.
#[derive(Debug, Default)]
pub struct RequestQueue {
    pending: Vec<Request>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a request. Ids must be unique across the queue.
    ///
    /// Returns the request's zero-based position after reordering.
    pub fn enqueue(&mut self, request: Request) -> Result<usize, AgentError> {
        if self.contains(&request.id) {
            return Err(AgentError::DuplicateRequest(request.id));
        }

        let id = request.id.clone();
        self.pending.push(request);
        // sort_by_key is stable, so equal tiers keep arrival order.
        self.pending.sort_by_key(|r| r.priority.rank());

        Ok(self
            .pending
            .iter()
            .position(|r| r.id == id)
            .unwrap_or(self.pending.len() - 1))
    }

    /// Pop the head of the queue.
    pub fn pop(&mut self) -> Option<Request> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    /// Remove a pending request by id.
    pub fn remove(&mut self, id: &str) -> Option<Request> {
        let index = self.pending.iter().position(|r| r.id == id)?;
        Some(self.pending.remove(index))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pending.iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending requests in service order.
    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.pending.iter()
    }
}
