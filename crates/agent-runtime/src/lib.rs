//! Agent runtime for executing agents
//!
//! This crate provides the runtime infrastructure for executing agents,
//! including the AgentExecutor for LLM tool loops (blocking and streamed),
//! AgentRuntime as a factory over a shared provider, and the concrete
//! agent implementations used by the assistant.

pub mod agents;
pub mod executor;
pub mod profile;
pub mod runtime;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types
pub use agents::{DelegateTool, SimpleAgent, TeamAgent, TeamAgentBuilder, ToolAgent};
pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
pub use profile::AgentProfile;
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};
