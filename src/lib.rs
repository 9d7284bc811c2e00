// ABOUTME: Root module for agentcore - request lifecycle engine for tool agents.
// ABOUTME: Re-exports all public types from submodules.

pub mod admission;
pub mod agent;
pub mod cache;
pub mod config;
pub mod error;
pub mod hook;
pub mod metrics;
pub mod prelude;
pub mod queue;
pub mod telemetry;
pub mod tool;

pub use error::Error;
