// ABOUTME: JSON-lines front end for a single agent wrapping an echo tool.
// ABOUTME: Reads signals from stdin and writes notifications to stdout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use agentcore::prelude::*;

// ============================================================================
// Echo Tool
// ============================================================================

struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Return the params unchanged, optionally after a delay."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "delay_ms": {
                    "type": "integer",
                    "description": "Milliseconds to wait before answering"
                }
            }
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, anyhow::Error> {
        if let Some(ms) = params.get("delay_ms").and_then(Value::as_u64) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        Ok(params)
    }
}

// ============================================================================
// Main
// ============================================================================

fn load_config() -> Result<AgentConfig> {
    let config = match std::env::var("AGENT_CONFIG") {
        Ok(path) => AgentConfig::load(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => AgentConfig::default(),
    };
    Ok(config.apply_env()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    init_tracing("info");

    let config = load_config()?;

    let registry = Registry::new();
    registry.register(EchoTool).await;
    let executor = Arc::new(RegistryExecutor::new(registry));

    let (handle, mut notifications) = AgentBuilder::new("echo", executor).config(config).spawn()?;
    info!(tool = handle.tool(), "agent ready, reading signals from stdin");

    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(notification) = notifications.recv().await {
            let mut line = serde_json::to_string(&notification)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match Signal::from_json(line) {
            Ok(signal) => handle.send(signal).await?,
            Err(e) => warn!(error = %e, line, "skipping malformed signal"),
        }
    }

    // Closing the last handle lets the agent finish queued work and stop.
    drop(handle);
    printer.await??;
    Ok(())
}
