// ABOUTME: Tool module - the opaque capability an agent wraps.
// ABOUTME: Tool trait, registry, and the executor collaborator interface.

mod executor;
mod registry;
mod traits;

pub use executor::*;
pub use registry::*;
pub use traits::*;

#[cfg(test)]
mod executor_test;
