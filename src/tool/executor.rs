// ABOUTME: Defines ToolExecutor - the collaborator that actually runs tools.
// ABOUTME: RegistryExecutor dispatches to registered tools under a timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::Registry;
use crate::error::{AgentError, ToolError};

/// Runs a tool by identifier. Must be safe to call concurrently.
///
/// The `timeout` is the agent's configured budget. Honouring it is part of
/// the executor's contract: the agent does not enforce it for single
/// requests.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(
        &self,
        tool: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, anyhow::Error>;
}

/// Executor backed by a tool [`Registry`].
#[derive(Clone, Default)]
pub struct RegistryExecutor {
    registry: Registry,
}

impl RegistryExecutor {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[async_trait]
impl ToolExecutor for RegistryExecutor {
    async fn execute(
        &self,
        tool: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, anyhow::Error> {
        let Some(handle) = self.registry.get(tool).await else {
            return Err(ToolError::NotFound(tool.to_string()).into());
        };

        match tokio::time::timeout(timeout, handle.execute(params)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ToolError::Execution(e).into()),
            Err(_) => Err(AgentError::Timeout(timeout).into()),
        }
    }
}
