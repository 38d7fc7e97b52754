//! Error types for the investment assistant

use crate::market::MarketDataError;
use thiserror::Error;

/// Message shown when a symbol field holds no usable ticker
pub const EMPTY_SYMBOLS_MESSAGE: &str = "Please enter valid stock symbols.";

/// Assistant level errors
#[derive(Debug, Error)]
pub enum AssistError {
    /// Symbol input contained no ticker after trimming
    #[error("{EMPTY_SYMBOLS_MESSAGE}")]
    EmptySymbols,

    /// Chat message was empty
    #[error("Message is empty")]
    EmptyMessage,

    /// A reply is still streaming for this session
    #[error("A response is still streaming for this session")]
    Busy,

    /// No reply was being streamed when one was completed
    #[error("No response is in progress")]
    NoActiveTurn,

    /// Unknown chat session
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Market data failure
    #[error(transparent)]
    Market(#[from] MarketDataError),

    /// Agent or model backend failure
    #[error("Agent error: {0}")]
    Agent(#[from] agent_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template rendering failure
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl AssistError {
    /// Whether the error stems from user input rather than a backend
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptySymbols | Self::EmptyMessage)
    }
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistError>;

impl From<AssistError> for agent_core::Error {
    fn from(err: AssistError) -> Self {
        match err {
            AssistError::Agent(inner) => inner,
            other => agent_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

impl From<agent_llm::LLMError> for AssistError {
    fn from(err: agent_llm::LLMError) -> Self {
        AssistError::Agent(err.into())
    }
}
