// ABOUTME: Active set - requests currently handed to the executor.
// ABOUTME: Bounded by a concurrency ceiling, one by default.

use std::collections::HashMap;

use super::request::Request;

/// In-flight requests keyed by id.
#[derive(Debug)]
pub struct ActiveSet {
    requests: HashMap<String, Request>,
    max_concurrent: usize,
}

impl ActiveSet {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            requests: HashMap::new(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Whether another request may be dispatched.
    pub fn has_capacity(&self) -> bool {
        self.requests.len() < self.max_concurrent
    }

    pub(crate) fn insert(&mut self, request: Request) {
        self.requests.insert(request.id.clone(), request);
    }

    /// Remove a request that reached a terminal state.
    pub fn complete(&mut self, id: &str) -> Option<Request> {
        self.requests.remove(id)
    }

    /// Mark an in-flight request cancelled. The execution keeps running.
    pub fn flag_cancelled(&mut self, id: &str) -> bool {
        match self.requests.get_mut(id) {
            Some(request) => {
                request.cancelled = true;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Request> {
        self.requests.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.requests.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}
