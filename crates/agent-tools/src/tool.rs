//! Tool trait definition

use agent_core::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Each tool provides a name, description, and JSON schema for its input.
/// The name must match the one sent to the model in the tool definition.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with parameters matching [`Tool::input_schema`]
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique name within a [`ToolRegistry`](crate::ToolRegistry)
    fn name(&self) -> &str;

    /// Tells the model when to use this tool
    fn description(&self) -> &str;

    /// Input schema (JSON Schema)
    ///
    /// ```
    /// use serde_json::json;
    ///
    /// // Schema for a tool taking a single ticker symbol
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "symbol": { "type": "string", "description": "Ticker, e.g. NVDA or TCS.NS" }
    ///     },
    ///     "required": ["symbol"]
    /// });
    /// assert_eq!(schema["required"][0], "symbol");
    /// ```
    fn input_schema(&self) -> Value;
}
