//! LLM provider abstraction layer for invest-assist
//!
//! This crate provides provider-agnostic abstractions for interacting with
//! Large Language Models (LLMs). It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Tool definitions for function calling
//! - Provider trait with blocking and streaming completion
//! - An OpenAI-compatible provider usable with Groq, Gemini and OpenAI

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod sse;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::{LLMEventStream, LLMProvider, StreamEvent, response_events};
pub use tools::ToolDefinition;
