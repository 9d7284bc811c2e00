// ABOUTME: The agent actor - a message loop that owns AgentState.
// ABOUTME: Dispatches executions as tasks and applies their completions in order.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval};
use tracing::{Instrument, debug, info_span, warn};

use super::batch::BatchRunner;
use super::handle::AgentHandle;
use super::message::{Completion, Envelope, Notification, RequestStatus, Signal, ToolRequest};
use super::state::{AgentState, Intake};
use crate::config::AgentConfig;
use crate::error::{AgentError, ConfigError};
use crate::hook::{AgentHooks, NoHooks, guarded_post_process};
use crate::queue::Request;
use crate::tool::ToolExecutor;

/// Stream of notifications emitted by an agent.
///
/// Bounded by `notification_capacity`. When the reader falls behind, new
/// notifications are dropped; awaited results still reach their callers.
pub type Notifications = mpsc::Receiver<Notification>;

/// Configures and starts an agent.
pub struct AgentBuilder {
    tool: String,
    executor: Arc<dyn ToolExecutor>,
    hooks: Arc<dyn AgentHooks>,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new(tool: impl Into<String>, executor: Arc<dyn ToolExecutor>) -> Self {
        Self {
            tool: tool.into(),
            executor,
            hooks: Arc::new(NoHooks),
            config: AgentConfig::default(),
        }
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hooks(mut self, hooks: impl AgentHooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn hooks_arc(mut self, hooks: Arc<dyn AgentHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Spawn the agent loop on the current tokio runtime.
    ///
    /// The loop runs until every [`AgentHandle`] is dropped and all queued
    /// and in-flight work has finished.
    pub fn spawn(self) -> Result<(AgentHandle, Notifications), ConfigError> {
        self.config.validate()?;

        let (mailbox_tx, mailbox_rx) = mpsc::channel(self.config.mailbox_capacity);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::channel(self.config.notification_capacity);

        let batch = BatchRunner::new(
            self.tool.clone(),
            Arc::clone(&self.executor),
            Arc::clone(&self.hooks),
            self.config.batch_concurrency,
            self.config.batch_item_timeout(),
        )
        .reporting_to(mailbox_tx.clone());

        let agent = Agent {
            state: AgentState::new(self.tool.clone(), &self.config),
            config: self.config,
            executor: self.executor,
            hooks: self.hooks,
            mailbox: mailbox_rx,
            completions_tx,
            completions_rx,
            notifications: notify_tx,
            waiters: HashMap::new(),
        };

        let span = info_span!("agent", tool = %self.tool);
        tokio::spawn(agent.run().instrument(span));

        Ok((AgentHandle::new(self.tool, mailbox_tx, batch), notify_rx))
    }
}

/// A single-tool actor. Construct through [`AgentBuilder`].
struct Agent {
    state: AgentState,
    config: AgentConfig,
    executor: Arc<dyn ToolExecutor>,
    hooks: Arc<dyn AgentHooks>,
    mailbox: mpsc::Receiver<Envelope>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    notifications: mpsc::Sender<Notification>,
    /// Callers awaiting the terminal notification of a request.
    waiters: HashMap<String, oneshot::Sender<Notification>>,
}

impl Agent {
    async fn run(mut self) {
        let mut sweep = self
            .config
            .cache_sweep_interval()
            .map(|period| tokio::time::interval_at(Instant::now() + period, period));
        let mut accepting = true;

        debug!("agent started");

        loop {
            if !accepting && self.state.is_idle() {
                break;
            }

            tokio::select! {
                envelope = self.mailbox.recv(), if accepting => match envelope {
                    Some(envelope) => self.handle_envelope(envelope),
                    None => {
                        debug!("all handles dropped, draining");
                        accepting = false;
                    }
                },
                Some(done) = self.completions_rx.recv() => self.handle_completion(done),
                () = next_sweep(&mut sweep) => {
                    let purged = self.state.purge_expired(Instant::now());
                    if purged > 0 {
                        debug!(purged, "expired cache entries purged");
                    }
                }
            }
        }

        debug!("agent stopped");
    }

    fn handle_envelope(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::Signal { signal, reply } => self.handle_signal(signal, reply),
            Envelope::BatchSettled { success, elapsed } => {
                self.state.record_batch_item(success, elapsed);
            }
        }
    }

    fn handle_signal(&mut self, signal: Signal, reply: Option<oneshot::Sender<Notification>>) {
        match signal {
            Signal::ToolRequest(request) => self.handle_tool_request(request, reply),
            Signal::CancelRequest { request_id } => {
                let response = self.state.cancel(&request_id);
                if response.is_terminal() {
                    // A dequeued request never completes; release its waiter.
                    if let Some(waiter) = self.waiters.remove(&request_id) {
                        let _ = waiter.send(response.clone());
                    }
                }
                self.respond(response, reply);
            }
            Signal::GetMetrics => {
                let report = self.state.metrics_report();
                self.respond(Notification::MetricsReport(report), reply);
            }
            Signal::ClearCache => {
                let response = self.state.clear_cache();
                self.respond(response, reply);
            }
            Signal::Unknown => {
                warn!("unhandled signal");
                let error = AgentError::Unhandled("unrecognized signal type".into());
                self.respond(Notification::error(None, &error, false), reply);
            }
        }
    }

    fn handle_tool_request(
        &mut self,
        request: ToolRequest,
        reply: Option<oneshot::Sender<Notification>>,
    ) {
        match self
            .state
            .intake(request, self.hooks.as_ref(), Instant::now())
        {
            Intake::Rejected { request_id, error } => {
                self.answer(Notification::error(Some(request_id), &error, false), reply);
            }
            Intake::CacheHit { request_id, result } => {
                let notification =
                    Notification::result(request_id, result, Default::default(), true, false);
                self.answer(notification, reply);
            }
            Intake::Queued {
                request_id,
                position,
            } => {
                if let Some(reply) = reply {
                    self.waiters.insert(request_id.clone(), reply);
                }
                self.emit(Notification::Progress {
                    request_id,
                    status: RequestStatus::Queued,
                    position: Some(position),
                });
                self.pump();
            }
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        if let Some(notification) = self.state.complete(done, Instant::now()) {
            self.finish(notification);
        }
        self.pump();
    }

    /// Dispatch queued requests while the active set has room.
    fn pump(&mut self) {
        while let Some(request) = self.state.next_dispatch() {
            self.dispatch(request);
        }
    }

    fn dispatch(&mut self, request: Request) {
        debug!(request_id = %request.id, "dispatching");
        self.emit(Notification::progress(request.id.clone(), RequestStatus::Running));

        let executor = Arc::clone(&self.executor);
        let hooks = Arc::clone(&self.hooks);
        let completions = self.completions_tx.clone();
        let tool = self.state.tool().to_string();
        let timeout = self.config.tool_timeout();

        tokio::spawn(
            async move {
                let started = Instant::now();
                let call = AssertUnwindSafe(executor.execute(&tool, request.params.clone(), timeout))
                    .catch_unwind()
                    .await;

                let outcome = match call {
                    Ok(Ok(value)) => guarded_post_process(hooks.as_ref(), &request.params, value),
                    Ok(Err(e)) => Err(format!("{:#}", e)),
                    Err(_) => Err("executor panicked".to_string()),
                };

                let _ = completions.send(Completion {
                    request_id: request.id,
                    outcome,
                    elapsed: started.elapsed(),
                });
            }
            .in_current_span(),
        );
    }

    /// Emit a completion, also releasing the request's waiter.
    fn finish(&mut self, notification: Notification) {
        let waiter = notification
            .request_id()
            .and_then(|id| self.waiters.remove(id));
        self.answer(notification, waiter);
    }

    /// Emit a terminal notification, copying it to `reply` when present.
    fn answer(&self, notification: Notification, reply: Option<oneshot::Sender<Notification>>) {
        if let Some(reply) = reply {
            let _ = reply.send(notification.clone());
        }
        self.emit(notification);
    }

    /// Send a direct answer to `reply`, or to the stream without one.
    fn respond(&self, notification: Notification, reply: Option<oneshot::Sender<Notification>>) {
        match reply {
            Some(reply) => {
                let _ = reply.send(notification);
            }
            None => self.emit(notification),
        }
    }

    fn emit(&self, notification: Notification) {
        // Nobody listening is fine; delivery is best-effort.
        if let Err(mpsc::error::TrySendError::Full(dropped)) =
            self.notifications.try_send(notification)
        {
            debug!(
                request_id = dropped.request_id().unwrap_or_default(),
                "notification stream full, dropping"
            );
        }
    }
}

async fn next_sweep(sweep: &mut Option<Interval>) {
    match sweep {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
