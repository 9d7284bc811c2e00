// ABOUTME: Defines Request and Priority - the unit of work an agent owns.
// ABOUTME: Requests live in the queue or active set until terminal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use uuid::Uuid;

/// Service tier of a request. Lower rank is served first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Normal => write!(f, "normal"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A unit of work accepted by an agent.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique identifier, caller-supplied or generated.
    pub id: String,

    /// Tool parameters.
    pub params: Value,

    pub priority: Priority,

    /// Key for result caching; `None` disables caching for this request.
    pub cache_key: Option<String>,

    pub created_at: Instant,

    /// Set when cancellation arrives after dispatch.
    pub cancelled: bool,
}

impl Request {
    /// Create a request with a generated id and normal priority.
    pub fn new(params: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            params,
            priority: Priority::Normal,
            cache_key: None,
            created_at: Instant::now(),
            cancelled: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }
}
