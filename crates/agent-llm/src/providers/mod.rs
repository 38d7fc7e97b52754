//! Concrete LLM provider implementations
//!
//! Every supported backend speaks the OpenAI chat-completions dialect, so a
//! single provider covers them; [`Backend`] selects base URL and credentials.

pub mod openai;

pub use openai::{Backend, OpenAIConfig, OpenAIProvider, StreamParser};
