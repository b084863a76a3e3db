// ABOUTME: Tool module - defines tools, the registry, and dispatch results.
// ABOUTME: Core catalog the agent resolves model tool calls against.

mod registry;
mod result;
mod traits;

pub use registry::*;
pub use result::*;
pub use traits::*;

#[cfg(test)]
mod result_test;
