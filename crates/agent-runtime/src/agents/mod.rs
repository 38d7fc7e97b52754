//! Concrete agent implementations
//!
//! This module provides concrete implementations of the Agent trait:
//! - SimpleAgent: one model call per prompt, no tools
//! - ToolAgent: LLM loop with tool execution
//! - TeamAgent: a leader that hands tasks to member agents through
//!   delegation tools

pub mod simple;
pub mod team;
pub mod tool;

pub use simple::SimpleAgent;
pub use team::{DelegateTool, TeamAgent, TeamAgentBuilder};
pub use tool::ToolAgent;
