//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use crate::profile::AgentProfile;
use agent_core::{Agent, Context, Result, TextStream};
use async_trait::async_trait;

/// An agent that uses the LLM loop with tool execution
///
/// ToolAgent wraps the AgentExecutor to provide the Agent trait interface.
/// Earlier turns from the [`Context`] history are replayed to the model.
pub struct ToolAgent {
    executor: AgentExecutor,
    profile: AgentProfile,
}

impl ToolAgent {
    /// Create a new tool agent
    ///
    /// The executor should already carry the profile's system prompt; use
    /// [`AgentRuntime::create_tool_agent`](crate::AgentRuntime::create_tool_agent)
    /// to get that wiring.
    pub fn new(executor: AgentExecutor, profile: AgentProfile) -> Self {
        Self { executor, profile }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }

    /// Get the agent's profile
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        self.executor.run_with_history(input, context.history()).await
    }

    async fn process_stream(&self, input: String, context: &mut Context) -> Result<TextStream> {
        Ok(self.executor.run_stream(input, context.history()))
    }

    fn name(&self) -> &str {
        &self.profile.name
    }

    fn description(&self) -> &str {
        self.profile.description.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::AgentExecutorBuilder;
    use crate::test_support::{ScriptedProvider, text_response};
    use agent_core::{ConversationTurn, collect_text};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_tool_agent_uses_context_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("Buy rating")]));
        let executor = AgentExecutorBuilder::new().provider(provider.clone()).build().unwrap();
        let agent = ToolAgent::new(executor, AgentProfile::new("Finance AI Agent"));

        let mut ctx = Context::new().with_history(vec![ConversationTurn::user("About NVDA")]);
        let stream = agent
            .process_stream("Its recommendation?".to_string(), &mut ctx)
            .await
            .unwrap();

        assert_eq!(collect_text(stream).await.unwrap(), "Buy rating");
        assert_eq!(provider.request(0).messages.len(), 2);
        assert_eq!(agent.name(), "Finance AI Agent");
    }
}
