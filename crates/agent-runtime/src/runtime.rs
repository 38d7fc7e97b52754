//! Runtime for creating agents over a shared provider
//!
//! The AgentRuntime owns the LLM provider and model defaults, and provides
//! factory methods for the different agent kinds.

use agent_core::{Error, Result};
use agent_llm::LLMProvider;
use agent_tools::ToolRegistry;
use std::sync::Arc;
use tracing::info;

use crate::agents::{SimpleAgent, TeamAgentBuilder, ToolAgent};
use crate::executor::{AgentExecutor, ExecutorConfig};
use crate::profile::AgentProfile;

/// Configuration for the agent runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Default maximum iterations for tool-using agents
    pub default_max_iterations: usize,

    /// Default model to use
    pub default_model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let executor = ExecutorConfig::default();
        Self {
            default_max_iterations: executor.max_iterations,
            default_model: executor.model,
            max_tokens: executor.max_tokens,
            temperature: executor.temperature,
        }
    }
}

/// Factory for agents sharing one LLM provider
///
/// # Example
///
/// ```no_run
/// use agent_runtime::{AgentProfile, AgentRuntime};
/// use agent_tools::ToolRegistry;
/// use std::sync::Arc;
///
/// # fn example(provider: Arc<dyn agent_llm::LLMProvider>) -> agent_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .provider(provider)
///     .default_model("llama3-70b-8192")
///     .build()?;
///
/// let analyst = runtime.create_simple_agent(AgentProfile::new("Market Analyst"));
/// let finance = runtime.create_tool_agent(
///     AgentProfile::new("Finance AI Agent"),
///     Arc::new(ToolRegistry::new()),
/// );
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(provider: Arc<dyn LLMProvider>, config: RuntimeConfig) -> Self {
        Self { provider, config }
    }

    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Executor configuration derived from the runtime defaults
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_iterations: self.config.default_max_iterations,
            model: self.config.default_model.clone(),
            system_prompt: None,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    /// Create a simple agent (one model call, no tools)
    pub fn create_simple_agent(&self, profile: AgentProfile) -> SimpleAgent {
        SimpleAgent::new(self.provider.clone(), profile, self.executor_config())
    }

    /// Create a tool-using agent over the given registry
    pub fn create_tool_agent(&self, profile: AgentProfile, tools: Arc<ToolRegistry>) -> ToolAgent {
        info!(agent = %profile.name, tools = ?tools.names(), "Creating tool agent");
        let mut config = self.executor_config();
        config.system_prompt = Some(profile.system_prompt());
        let executor = AgentExecutor::new(self.provider.clone(), tools, config);
        ToolAgent::new(executor, profile)
    }

    /// Start building a team led by `profile`
    pub fn team(&self, profile: AgentProfile) -> TeamAgentBuilder {
        TeamAgentBuilder::new(self.provider.clone(), profile).config(self.executor_config())
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the full runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set default maximum iterations
    pub fn default_max_iterations(mut self, max: usize) -> Self {
        self.config.default_max_iterations = max;
        self
    }

    /// Set default model
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    /// Set max tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = Some(temperature);
        self
    }

    /// Build the runtime
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;

        Ok(AgentRuntime::new(provider, self.config))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedProvider, text_response};
    use agent_core::{Agent, Context};

    #[test]
    fn test_builder_requires_provider() {
        assert!(AgentRuntime::builder().build().is_err());
    }

    #[tokio::test]
    async fn test_agents_inherit_runtime_defaults() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("done")]));
        let runtime = AgentRuntime::builder()
            .provider(provider.clone())
            .default_model("gemini-2.5-pro")
            .max_tokens(2048)
            .temperature(0.2)
            .build()
            .unwrap();

        let agent = runtime.create_tool_agent(
            AgentProfile::new("Finance AI Agent").instruction("Use tables to display the data"),
            Arc::new(ToolRegistry::new()),
        );
        assert_eq!(agent.executor().config().model, "gemini-2.5-pro");

        agent
            .process("NVDA fundamentals".to_string(), &mut Context::new())
            .await
            .unwrap();

        let request = provider.request(0);
        assert_eq!(request.model, "gemini-2.5-pro");
        assert_eq!(request.max_tokens, 2048);
        assert!(request.system.unwrap().contains("Use tables"));
    }
}
