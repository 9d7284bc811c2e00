// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use agentcore::prelude::*;` to get started quickly.

pub use crate::agent::{
    AgentBuilder, AgentHandle, BatchItemResult, BatchReport, Notification, Notifications,
    RequestStatus, Signal, ToolRequest,
};
pub use crate::config::AgentConfig;
pub use crate::error::{AgentError, ConfigError, Error, ToolError};
pub use crate::hook::{AgentHooks, NoHooks, RequiredFields};
pub use crate::metrics::{Metrics, MetricsReport};
pub use crate::queue::Priority;
pub use crate::telemetry::init_tracing;
pub use crate::tool::{Registry, RegistryExecutor, Tool, ToolExecutor, ToolInfo};
