//! Execution context for agents
//!
//! The `Context` carries per-request state into an agent call: the prior
//! conversation for chat-style agents plus a flexible key-value store for
//! anything else a caller wants to thread through.

use crate::ConversationTurn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Session ID for tracking
    pub const SESSION_ID: &str = "session_id";
    /// Symbols the current request is about
    pub const SYMBOLS: &str = "symbols";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use agent_core::{Context, ConversationTurn};
///
/// let ctx = Context::new()
///     .with_session_id("session-123")
///     .with_history(vec![ConversationTurn::user("Hi")]);
///
/// assert_eq!(ctx.session_id(), Some("session-123"));
/// assert_eq!(ctx.history().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Prior conversation, oldest first
    history: Vec<ConversationTurn>,
    /// Key-value storage for context data
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Set the conversation history
    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    // =========== Common Accessors ===========

    /// Get the session ID
    pub fn session_id(&self) -> Option<&str> {
        self.get(keys::SESSION_ID).and_then(|v| v.as_str())
    }

    /// Prior conversation turns
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Append a turn to the history
    pub fn push_turn(&mut self, turn: ConversationTurn) {
        self.history.push(turn);
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Check if the context carries neither history nor values
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.history.is_empty()
    }
}
