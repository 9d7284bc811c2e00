// ABOUTME: Defines the Tool trait - one external capability behind an agent.
// ABOUTME: Tools have a name, description, schema, and async execute method.

use async_trait::async_trait;
use serde_json::Value;

/// A tool whose execution is opaque to the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool with already-validated parameters.
    async fn execute(&self, params: Value) -> Result<Value, anyhow::Error>;
}
