// ABOUTME: Defines all error types for the agentcore library using thiserror.
// ABOUTME: Each concern has its own error enum, unified under Error.

use std::time::Duration;

/// Top-level error type for the agentcore library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Failures surfaced for a single request. None of these stop the agent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Rate limited, retry after {}ms", retry_after.as_millis())]
    RateLimited { retry_after: Duration },

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Request not found: {0}")]
    NotFound(String),

    #[error("Duplicate request id: {0}")]
    DuplicateRequest(String),

    #[error("Unhandled signal: {0}")]
    Unhandled(String),

    #[error("Agent stopped")]
    AgentStopped,
}

impl AgentError {
    /// Stable machine-readable code carried in error notifications.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::ValidationFailed(_) => "validation_failed",
            AgentError::RateLimited { .. } => "rate_limited",
            AgentError::ExecutionFailed(_) => "execution_failed",
            AgentError::Timeout(_) => "timeout",
            AgentError::NotFound(_) => "not_found",
            AgentError::DuplicateRequest(_) => "duplicate_request",
            AgentError::Unhandled(_) => "unhandled",
            AgentError::AgentStopped => "agent_stopped",
        }
    }

    /// Suggested delay before retrying, only set for rate-limit rejections.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AgentError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from tool operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Execution failed: {0}")]
    Execution(#[source] anyhow::Error),
}

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Bad value for {var}: {reason}")]
    Env { var: String, reason: String },
}
