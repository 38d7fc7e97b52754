//! Simple agent implementation (LLM only, no tools)

use crate::executor::{AgentExecutor, ExecutorConfig};
use crate::profile::AgentProfile;
use agent_core::{Agent, Context, Result, TextStream};
use agent_llm::LLMProvider;
use agent_tools::ToolRegistry;
use async_trait::async_trait;
use std::sync::Arc;

/// A simple agent that answers every prompt with exactly one model call
///
/// Suitable for the analysis stages of a report, where the prompt already
/// contains all the data the model needs.
///
/// # Example
///
/// ```no_run
/// use agent_runtime::{AgentProfile, ExecutorConfig, SimpleAgent};
/// use agent_core::{Agent, Context};
/// # use std::sync::Arc;
///
/// # async fn example(provider: Arc<dyn agent_llm::LLMProvider>) -> agent_core::Result<()> {
/// let profile = AgentProfile::new("Market Analyst")
///     .description("Analyzes and compares stock performance over time.");
///
/// let agent = SimpleAgent::new(provider, profile, ExecutorConfig::default());
/// let mut context = Context::new();
/// let response = agent
///     .process("Compare these stock performances: ...".to_string(), &mut context)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct SimpleAgent {
    executor: AgentExecutor,
    profile: AgentProfile,
}

impl SimpleAgent {
    /// Create a new simple agent
    ///
    /// The profile's system prompt replaces any prompt set in `config`.
    pub fn new(provider: Arc<dyn LLMProvider>, profile: AgentProfile, mut config: ExecutorConfig) -> Self {
        config.system_prompt = Some(profile.system_prompt());
        config.max_iterations = 1;
        let executor = AgentExecutor::new(provider, Arc::new(ToolRegistry::new()), config);
        Self { executor, profile }
    }

    /// Get the agent's profile
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }
}

#[async_trait]
impl Agent for SimpleAgent {
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
    use crate::test_support::{ScriptedProvider, text_response};

    #[tokio::test]
    async fn test_simple_agent_single_call() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("AAPL outperformed")]));
        let agent = SimpleAgent::new(
            provider.clone(),
            AgentProfile::new("Market Analyst").description("Compares stocks"),
            ExecutorConfig::default(),
        );

        let mut ctx = Context::new();
        let answer = agent
            .process("Compare these stock performances: {}".to_string(), &mut ctx)
            .await
            .unwrap();

        assert_eq!(answer, "AAPL outperformed");
        assert_eq!(agent.name(), "Market Analyst");
        assert_eq!(agent.description(), "Compares stocks");
        assert_eq!(provider.request_count(), 1);
        assert!(provider.request(0).tools.is_none());
        assert!(
            provider
                .request(0)
                .system
                .unwrap()
                .contains("Compares stocks")
        );
    }
}
