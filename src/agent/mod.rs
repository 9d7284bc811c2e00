// ABOUTME: Agent module - the request lifecycle engine every tool agent runs.
// ABOUTME: Actor loop, handle, owned state, messages and batch fan-out.

mod actor;
mod batch;
mod handle;
mod message;
mod state;

pub use actor::{AgentBuilder, Notifications};
pub use batch::{BatchItemResult, BatchReport, BatchRunner};
pub use handle::AgentHandle;
pub use message::{Notification, RequestStatus, Signal, ToolRequest};
pub use state::{AgentState, Intake};

#[cfg(test)]
mod message_test;
#[cfg(test)]
mod test_support;
