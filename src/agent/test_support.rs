// ABOUTME: Mock executors shared by the agent tests.
// ABOUTME: Scripted behaviour from params, and a gate for controlling completion.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::tool::ToolExecutor;

/// Behaviour driven by params:
/// `{"delay_ms": n}` sleeps, `{"fail": "why"}` errors, `{"panic": true}`
/// panics, otherwise echoes `params["value"]` (or the params themselves).
#[derive(Default)]
pub struct ScriptedExecutor {
    calls: AtomicUsize,
    seen: Mutex<Vec<Value>>,
}

impl ScriptedExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Value> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        _tool: &str,
        params: Value,
        _timeout: Duration,
    ) -> Result<Value, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(params.clone());

        if let Some(ms) = params["delay_ms"].as_u64() {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if params["panic"].as_bool() == Some(true) {
            panic!("scripted panic");
        }
        if let Some(reason) = params["fail"].as_str() {
            return Err(anyhow::anyhow!("{}", reason));
        }

        Ok(match params.get("value") {
            Some(v) => v.clone(),
            None => params,
        })
    }
}

/// Every call blocks until a permit is released.
pub struct GatedExecutor {
    gate: Semaphore,
    started: Mutex<Vec<Value>>,
}

impl GatedExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            started: Mutex::new(Vec::new()),
        })
    }

    /// Let `n` blocked or future calls finish.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn started(&self) -> Vec<Value> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutor for GatedExecutor {
    async fn execute(
        &self,
        _tool: &str,
        params: Value,
        _timeout: Duration,
    ) -> Result<Value, anyhow::Error> {
        self.started.lock().unwrap().push(params.clone());
        let permit = self.gate.acquire().await?;
        permit.forget();
        Ok(params)
    }
}
