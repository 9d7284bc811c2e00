// ABOUTME: Tests for RegistryExecutor - lookup, failure mapping and timeouts.
// ABOUTME: Uses small in-file tools with scripted behaviour.

use std::time::Duration;

use serde_json::{Value, json};

use super::*;
use crate::error::{AgentError, ToolError};

struct UpperTool;

#[async_trait::async_trait]
impl Tool for UpperTool {
    fn name(&self) -> &str {
        "upper"
    }

    fn description(&self) -> &str {
        "Uppercases text"
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"text": {"type": "string"}}})
    }

    async fn execute(&self, params: Value) -> Result<Value, anyhow::Error> {
        let text = params["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing text"))?;
        Ok(json!(text.to_uppercase()))
    }
}

struct SleepyTool;

#[async_trait::async_trait]
impl Tool for SleepyTool {
    fn name(&self) -> &str {
        "sleepy"
    }

    fn description(&self) -> &str {
        "Never finishes in time"
    }

    fn schema(&self) -> Value {
        json!({"type": "object"})
    }

    async fn execute(&self, _params: Value) -> Result<Value, anyhow::Error> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Value::Null)
    }
}

async fn executor() -> RegistryExecutor {
    let registry = Registry::new();
    registry.register(UpperTool).await;
    registry.register(SleepyTool).await;
    RegistryExecutor::new(registry)
}

#[tokio::test]
async fn test_executes_registered_tool() {
    let executor = executor().await;
    let out = executor
        .execute("upper", json!({"text": "hi"}), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(out, json!("HI"));
}

#[tokio::test]
async fn test_unknown_tool_is_not_found() {
    let executor = executor().await;
    let err = executor
        .execute("missing", json!({}), Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ToolError>(),
        Some(ToolError::NotFound(name)) if name == "missing"
    ));
}

#[tokio::test]
async fn test_tool_failure_is_execution_error() {
    let executor = executor().await;
    let err = executor
        .execute("upper", json!({}), Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("missing text"));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_enforced() {
    let executor = executor().await;
    let err = executor
        .execute("sleepy", json!({}), Duration::from_millis(50))
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<AgentError>(),
        Some(&AgentError::Timeout(Duration::from_millis(50)))
    );
}
