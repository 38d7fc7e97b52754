//! Tool registry for managing available tools

use crate::Tool;
use agent_core::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Registry for managing tools
///
/// Tools are kept ordered by name so the definitions sent to the model are
/// stable between requests.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        debug!(tool = tool.name(), "Registering tool");
        tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    /// List all registered tools, ordered by name
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().cloned().collect()
    }

    /// Names of all registered tools
    pub fn names(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.keys().cloned().collect()
    }

    /// Look up a tool and execute it
    pub async fn execute(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self.get(name).ok_or_else(|| Error::ToolFailed {
            tool: name.to_string(),
            reason: "unknown tool".to_string(),
        })?;
        tool.execute(params).await
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoSymbol(&'static str);

    #[async_trait]
    impl Tool for EchoSymbol {
        async fn execute(&self, params: Value) -> Result<Value> {
            Ok(json!({ "tool": self.0, "symbol": params["symbol"] }))
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echo the symbol back"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"symbol": {"type": "string"}}})
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(EchoSymbol("stock_price")));
        registry.register(Arc::new(EchoSymbol("company_news")));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("stock_price").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["company_news", "stock_price"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoSymbol("stock_price")));
        registry.register(Arc::new(EchoSymbol("stock_price")));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_by_name() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoSymbol("stock_price")));

        let out = registry
            .execute("stock_price", json!({"symbol": "NVDA"}))
            .await
            .unwrap();
        assert_eq!(out["symbol"], "NVDA");

        let err = registry.execute("nope", json!({})).await.unwrap_err();
        assert!(matches!(err, Error::ToolFailed { tool, .. } if tool == "nope"));
    }
}
