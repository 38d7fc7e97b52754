//! Team agent: a leader model that delegates to member agents
//!
//! Each member is exposed to the leader as a tool named
//! `transfer_task_to_<member>`. The leader decides which members to call,
//! reads their answers and writes the final reply.

use crate::executor::{AgentExecutor, ExecutorConfig};
use crate::profile::AgentProfile;
use agent_core::{Agent, Context, Error, Result, TextStream};
use agent_llm::LLMProvider;
use agent_tools::{Tool, ToolRegistry};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Tool that hands a task to one member agent
pub struct DelegateTool {
    member: Arc<dyn Agent>,
    tool_name: String,
    description: String,
}

impl DelegateTool {
    /// Wrap a member agent
    pub fn new(member: Arc<dyn Agent>) -> Self {
        let tool_name = format!("transfer_task_to_{}", tool_slug(member.name()));
        let description = match member.description() {
            "" => format!("Transfer a task to {}.", member.name()),
            role => format!("Transfer a task to {}: {role}", member.name()),
        };
        Self {
            member,
            tool_name,
            description,
        }
    }
}

/// Lowercase a name and collapse everything but letters and digits to `_`
fn tool_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

#[async_trait]
impl Tool for DelegateTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let task = params["task_description"]
            .as_str()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::ToolFailed {
                tool: self.tool_name.clone(),
                reason: "task_description is required".to_string(),
            })?;

        let mut prompt = task.to_string();
        if let Some(expected) = params["expected_output"].as_str() {
            prompt.push_str(&format!("\n\nExpected output: {expected}"));
        }

        info!(member = self.member.name(), "Delegating task");
        let mut context = Context::new();
        let answer = self.member.process(prompt, &mut context).await?;
        Ok(Value::String(answer))
    }

    fn name(&self) -> &str {
        &self.tool_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_description": {
                    "type": "string",
                    "description": "Clear description of the task, including any ticker symbols"
                },
                "expected_output": {
                    "type": "string",
                    "description": "What the answer should contain"
                }
            },
            "required": ["task_description"]
        })
    }
}

/// Leader agent with delegation tools for each member
pub struct TeamAgent {
    executor: AgentExecutor,
    profile: AgentProfile,
    members: Vec<Arc<dyn Agent>>,
}

impl TeamAgent {
    /// Start building a team led by a model described by `profile`
    pub fn builder(provider: Arc<dyn LLMProvider>, profile: AgentProfile) -> TeamAgentBuilder {
        TeamAgentBuilder::new(provider, profile)
    }

    /// Names of the member agents
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name()).collect()
    }

    /// Get the leader's executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for TeamAgent {
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

/// Builder for TeamAgent
pub struct TeamAgentBuilder {
    provider: Arc<dyn LLMProvider>,
    profile: AgentProfile,
    config: ExecutorConfig,
    members: Vec<Arc<dyn Agent>>,
}

impl TeamAgentBuilder {
    /// Create a new builder
    pub fn new(provider: Arc<dyn LLMProvider>, profile: AgentProfile) -> Self {
        Self {
            provider,
            profile,
            config: ExecutorConfig::default(),
            members: Vec::new(),
        }
    }

    /// Set the leader's executor configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a member agent
    pub fn member(mut self, agent: Arc<dyn Agent>) -> Self {
        self.members.push(agent);
        self
    }

    /// Build the team
    ///
    /// # Errors
    ///
    /// Returns an error if no members were added.
    pub fn build(self) -> Result<TeamAgent> {
        if self.members.is_empty() {
            return Err(Error::InitializationFailed("No team members added".to_string()));
        }

        let registry = Arc::new(ToolRegistry::new());
        let mut roster = String::from("\n\n## Team members");
        for member in &self.members {
            let tool = DelegateTool::new(member.clone());
            roster.push_str(&format!("\n- {} (tool `{}`)", member.name(), tool.name()));
            registry.register(Arc::new(tool));
        }
        roster.push_str(
            "\nDelegate tasks to the members best suited for them, then answer using their results.",
        );

        let mut config = self.config;
        config.system_prompt = Some(self.profile.system_prompt() + &roster);
        let executor = AgentExecutor::new(self.provider, registry, config);

        Ok(TeamAgent {
            executor,
            profile: self.profile,
            members: self.members,
        })
    }
}
