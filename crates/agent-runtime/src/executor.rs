//! Agent executor for running agent loops
//!
//! The AgentExecutor implements the core agent loop pattern:
//! 1. Call LLM with conversation history and available tools
//! 2. If tool use requested, execute tools and loop back
//! 3. Otherwise return the final answer
//!
//! [`AgentExecutor::run_stream`] runs the same loop but forwards every text
//! fragment to the caller as soon as the provider produces it.

use agent_core::{ConversationTurn, Error, Result, TextStream};
use agent_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, MessageContent, Role, StopReason,
    StreamEvent, ToolDefinition,
};
use agent_tools::ToolRegistry;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type ChunkSender = mpsc::UnboundedSender<Result<String>>;

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of model rounds (prevents endless tool loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "llama3-70b-8192".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.7),
        }
    }
}

/// One model round: the assistant message and why generation stopped
struct Round {
    message: Message,
    text: String,
    stop_reason: StopReason,
}

/// Executes an agent loop: LLM → tool calls → execution → loop back
///
/// Cloning is cheap; the provider and registry are shared.
#[derive(Clone)]
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    /// Create a new builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get the tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Execute the agent loop with a single user message
    pub async fn run(&self, user_message: String) -> Result<String> {
        self.run_with_history(user_message, &[]).await
    }

    /// Execute the agent loop after replaying earlier conversation turns
    pub async fn run_with_history(
        &self,
        user_message: String,
        history: &[ConversationTurn],
    ) -> Result<String> {
        let conversation = Self::conversation(user_message, history);
        self.drive(conversation, None).await
    }

    /// Execute the agent loop and stream the answer fragment by fragment
    ///
    /// The loop runs on a spawned task. Text produced in any round is
    /// forwarded as it arrives, so the concatenation of the stream equals the
    /// text [`AgentExecutor::run_with_history`] would return for the same
    /// model output. A failure ends the stream with one `Err` item.
    pub fn run_stream(&self, user_message: String, history: &[ConversationTurn]) -> TextStream {
        let conversation = Self::conversation(user_message, history);
        let (tx, rx) = mpsc::unbounded_channel();
        let executor = self.clone();

        tokio::spawn(async move {
            if let Err(e) = executor.drive(conversation, Some(&tx)).await {
                warn!(error = %e, "Streamed agent run failed");
                // Receiver may already be gone
                let _ = tx.send(Err(e));
            }
        });

        futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed()
    }

    fn conversation(user_message: String, history: &[ConversationTurn]) -> Vec<Message> {
        let mut conversation: Vec<Message> = history.iter().map(Message::from).collect();
        conversation.push(Message::user(user_message));
        conversation
    }

    async fn drive(&self, mut conversation: Vec<Message>, sink: Option<&ChunkSender>) -> Result<String> {
        let tools = self.build_tool_definitions();
        let mut answer = String::new();

        for iteration in 1..=self.config.max_iterations {
            info!(
                iteration,
                max_iterations = self.config.max_iterations,
                tool_count = tools.len(),
                model = %self.config.model,
                "Agent iteration started"
            );

            let request = self.build_request(conversation.clone(), tools.clone());
            let round = match sink {
                Some(tx) => self.streamed_round(request, tx).await?,
                None => self.blocking_round(request).await?,
            };

            answer.push_str(&round.text);
            let has_tool_uses = round.message.has_tool_uses();
            conversation.push(round.message.clone());

            match round.stop_reason {
                _ if has_tool_uses => {
                    let results = self.execute_tools(&round.message).await;
                    info!(
                        result_count = results.len(),
                        "Tool execution completed, continuing agent loop"
                    );
                    conversation.extend(results);
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok(answer);
                }
                StopReason::EndTurn | StopReason::ToolUse => {
                    info!(iteration, response_length = answer.len(), "Agent completed");
                    return Ok(answer);
                }
            }
        }

        warn!(
            max_iterations = self.config.max_iterations,
            "Max iterations reached, stopping"
        );
        Err(Error::ProcessingFailed(format!(
            "no final answer after {} model rounds",
            self.config.max_iterations
        )))
    }

    fn build_request(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> CompletionRequest {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(messages)
            .max_tokens(self.config.max_tokens)
            .tools(tools);
        if let Some(system) = &self.config.system_prompt {
            builder = builder.system(system.clone());
        }
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        builder.build()
    }

    async fn blocking_round(&self, request: CompletionRequest) -> Result<Round> {
        let response = self.provider.complete(request).await?;

        info!(
            stop_reason = ?response.stop_reason,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "LLM response received"
        );

        let text = response.message.text().unwrap_or_default().to_string();
        Ok(Round {
            message: response.message,
            text,
            stop_reason: response.stop_reason,
        })
    }

    async fn streamed_round(&self, request: CompletionRequest, tx: &ChunkSender) -> Result<Round> {
        let mut events = self.provider.stream(request).await?;
        let mut text = String::new();
        let mut tool_uses = Vec::new();
        let mut stop_reason = StopReason::EndTurn;

        while let Some(event) = events.next().await {
            match event? {
                StreamEvent::Text(fragment) => {
                    text.push_str(&fragment);
                    if tx.send(Ok(fragment)).is_err() {
                        debug!("Stream receiver dropped");
                    }
                }
                StreamEvent::ToolUse { id, name, input } => {
                    tool_uses.push(ContentBlock::ToolUse { id, name, input });
                }
                StreamEvent::Stop(reason) => stop_reason = reason,
            }
        }

        let mut blocks = Vec::with_capacity(tool_uses.len() + 1);
        if !text.is_empty() {
            blocks.push(ContentBlock::Text { text: text.clone() });
        }
        blocks.extend(tool_uses);

        Ok(Round {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(blocks)),
            },
            text,
            stop_reason,
        })
    }

    /// Build tool definitions from the registry
    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Execute tool calls from an assistant message
    ///
    /// Tool failures are reported back to the model as error results.
    async fn execute_tools(&self, message: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            let input_preview: String = input.to_string().chars().take(500).collect();
            info!(tool_name = %name, tool_id = %id, input_preview = %input_preview, "Executing tool");

            let start_time = std::time::Instant::now();
            match self.tool_registry.execute(name, input.clone()).await {
                Ok(result) => {
                    let result_str = match result {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    info!(
                        tool_name = %name,
                        duration_ms = start_time.elapsed().as_millis() as u64,
                        result_length = result_str.len(),
                        "Tool execution succeeded"
                    );
                    results.push(Message::tool_result(id.clone(), result_str));
                }
                Err(e) => {
                    warn!(
                        tool_name = %name,
                        duration_ms = start_time.elapsed().as_millis() as u64,
                        error = %e,
                        "Tool execution failed"
                    );
                    results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                }
            }
        }

        results
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
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

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self
            .provider
            .ok_or_else(|| Error::InitializationFailed("Provider not set".to_string()))?;

        Ok(AgentExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
