//! OpenAI-compatible provider implementation
//!
//! Implements [`LLMProvider`] against the `/chat/completions` endpoint shared
//! by OpenAI, Groq and Google's Gemini compatibility layer.
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Example
//!
//! ```no_run
//! use agent_llm::{CompletionRequest, LLMProvider, Message};
//! use agent_llm::providers::{Backend, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GROQ_API_KEY
//!     let provider = OpenAIProvider::from_env(Backend::Groq)?;
//!
//!     let request = CompletionRequest::builder(Backend::Groq.default_model())
//!         .add_message(Message::user("Summarise NVDA's last quarter"))
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```

use crate::provider::{LLMEventStream, StreamEvent};
use crate::sse::{DONE_MARKER, SseLineDecoder};
use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Model backends reachable through the OpenAI dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Groq cloud (Llama models)
    Groq,
    /// Google Gemini through its OpenAI compatibility endpoint
    Gemini,
    /// OpenAI
    OpenAI,
    /// Any other compatible server (LM Studio, vLLM, llama.cpp, ...)
    Custom,
}

impl Backend {
    /// Parse a backend name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "groq" => Some(Self::Groq),
            "gemini" | "google" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAI),
            "custom" | "local" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Provider name reported in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
            Self::Custom => "custom",
        }
    }

    /// Default API base URL
    pub fn default_api_base(&self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Custom => "http://localhost:1234/v1",
        }
    }

    /// Default model identifier
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Groq => "llama3-70b-8192",
            Self::Gemini => "gemini-2.5-pro",
            Self::OpenAI => "gpt-4o",
            Self::Custom => "local-model",
        }
    }

    /// Environment variables holding the API key, in lookup order
    pub fn api_key_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Groq => &["GROQ_API_KEY"],
            Self::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Self::OpenAI | Self::Custom => &["OPENAI_API_KEY"],
        }
    }
}

/// Configuration for the OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Backend this configuration targets
    pub backend: Backend,

    /// API key for authentication
    pub api_key: String,

    /// Base URL of the chat-completions API
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a config for a backend with its default base URL
    pub fn new(backend: Backend, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: api_key.into(),
            api_base: backend.default_api_base().to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from the backend's environment variables
    ///
    /// `LLM_API_BASE` overrides the base URL. A custom backend does not
    /// require a key.
    pub fn from_env(backend: Backend) -> Result<Self> {
        let api_key = backend
            .api_key_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()));

        let api_key = match (api_key, backend) {
            (Some(key), _) => key,
            (None, Backend::Custom) => "not-needed".to_string(),
            (None, _) => {
                return Err(LLMError::ConfigurationError(format!(
                    "{} environment variable not set",
                    backend.api_key_vars().join(" or ")
                )));
            }
        };

        let mut config = Self::new(backend, api_key);
        if let Ok(api_base) = std::env::var("LLM_API_BASE") {
            config.api_base = api_base;
        }
        Ok(config)
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// OpenAI-compatible chat-completions provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider from the backend's environment variables
    pub fn from_env(backend: Backend) -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env(backend)?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn build_request(request: CompletionRequest, stream: bool) -> OpenAIRequest {
        let openai_messages = build_openai_messages(request.system, request.messages);
        let openai_tools = request.tools.as_ref().map(|tools| convert_tools(tools));

        OpenAIRequest {
            model: request.model,
            messages: openai_messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            tools: openai_tools,
            stream,
        }
    }

    async fn send(&self, body: &OpenAIRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(status, error_text, &body.model));
        }

        Ok(response)
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(backend = self.config.backend.name(), model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending completion request to {}", self.config.api_base);

        let body = Self::build_request(request, false);
        let response = self.send(&body).await?;

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let usage = openai_response.usage.unwrap_or_default();
        debug!(
            "Received response - stop_reason: {}, tokens: {}/{}",
            choice.finish_reason.as_deref().unwrap_or("none"),
            usage.prompt_tokens,
            usage.completion_tokens
        );

        let message = parse_openai_response(choice.message)?;
        let stop_reason = map_stop_reason(choice.finish_reason.as_deref().unwrap_or("stop"));

        Ok(CompletionResponse {
            message,
            stop_reason,
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }

    #[instrument(skip(self, request), fields(backend = self.config.backend.name(), model = %request.model))]
    async fn stream(&self, request: CompletionRequest) -> Result<LLMEventStream> {
        debug!("Opening completion stream at {}", self.config.api_base);

        let body = Self::build_request(request, true);
        let response = self.send(&body).await?;

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();

        Ok(event_stream(bytes))
    }

    fn name(&self) -> &str {
        self.config.backend.name()
    }
}

// ============================================================================
// Streaming
// ============================================================================

struct StreamState {
    bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseLineDecoder,
    parser: StreamParser,
    pending: VecDeque<StreamEvent>,
    finished: bool,
}

impl StreamState {
    fn absorb(&mut self, payload: &str) -> Result<()> {
        let events = self.parser.feed(payload)?;
        self.pending.extend(events);
        if self.parser.is_finished() {
            self.finished = true;
        }
        Ok(())
    }
}

fn event_stream(bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> LLMEventStream {
    let state = StreamState {
        bytes,
        decoder: SseLineDecoder::new(),
        parser: StreamParser::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((Ok(event), state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    for payload in state.decoder.push(&chunk) {
                        if let Err(e) = state.absorb(&payload) {
                            state.finished = true;
                            return Some((Err(e), state));
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    let tail = state.decoder.finish();
                    let result = match tail {
                        Some(payload) => state.absorb(&payload),
                        None => Ok(()),
                    };
                    let result = result.and_then(|()| state.parser.finish());
                    state.finished = true;
                    match result {
                        Ok(events) => state.pending.extend(events),
                        Err(e) => return Some((Err(e), state)),
                    }
                }
            }
        }
    })
    .boxed()
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Turns chat-completion chunk payloads into [`StreamEvent`]s
///
/// Text deltas are emitted immediately. Tool-call fragments are accumulated
/// by index and emitted once the stream ends, followed by a single
/// [`StreamEvent::Stop`].
#[derive(Debug, Default)]
pub struct StreamParser {
    tool_calls: BTreeMap<usize, PartialToolCall>,
    stop_reason: Option<StopReason>,
    finished: bool,
}

impl StreamParser {
    /// Create an empty parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the terminating payload has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume one `data:` payload
    pub fn feed(&mut self, payload: &str) -> Result<Vec<StreamEvent>> {
        if self.finished {
            return Ok(Vec::new());
        }
        if payload == DONE_MARKER {
            return self.finish();
        }

        let chunk: StreamChunk = serde_json::from_str(payload)
            .map_err(|e| LLMError::UnexpectedResponse(format!("Bad stream chunk: {e}")))?;

        if let Some(error) = chunk.error {
            return Err(LLMError::RequestFailed(error.to_string()));
        }

        let mut events = Vec::new();
        for choice in chunk.choices {
            if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                events.push(StreamEvent::Text(text));
            }
            for call in choice.delta.tool_calls.unwrap_or_default() {
                let entry = self.tool_calls.entry(call.index).or_default();
                if let Some(id) = call.id {
                    entry.id = id;
                }
                if let Some(function) = call.function {
                    if let Some(name) = function.name {
                        entry.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        entry.arguments.push_str(&arguments);
                    }
                }
            }
            if let Some(reason) = choice.finish_reason {
                self.stop_reason = Some(map_stop_reason(&reason));
            }
        }
        Ok(events)
    }

    /// Emit accumulated tool calls and the stop event (once)
    pub fn finish(&mut self) -> Result<Vec<StreamEvent>> {
        if self.finished {
            return Ok(Vec::new());
        }
        self.finished = true;

        let mut events = Vec::new();
        for (_, call) in std::mem::take(&mut self.tool_calls) {
            let input = if call.arguments.trim().is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&call.arguments).map_err(|e| {
                    LLMError::UnexpectedResponse(format!("Failed to parse tool arguments: {e}"))
                })?
            };
            events.push(StreamEvent::ToolUse {
                id: call.id,
                name: call.name,
                input,
            });
        }

        let has_tools = events
            .iter()
            .any(|e| matches!(e, StreamEvent::ToolUse { .. }));
        let stop = match self.stop_reason {
            Some(reason) => reason,
            None if has_tools => StopReason::ToolUse,
            None => StopReason::EndTurn,
        };
        events.push(StreamEvent::Stop(stop));
        Ok(events)
    }
}

// ============================================================================
// OpenAI-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAIMessage {
    fn text(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

// ============================================================================
// OpenAI-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseToolCall {
    id: String,
    function: OpenAIResponseFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<StreamToolCall>>,
}

#[derive(Debug, Deserialize)]
struct StreamToolCall {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<StreamFunction>,
}

#[derive(Debug, Deserialize)]
struct StreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Build OpenAI messages; the system prompt leads the array
fn build_openai_messages(system: Option<String>, messages: Vec<Message>) -> Vec<OpenAIMessage> {
    let mut result = Vec::new();

    if let Some(sys) = system {
        result.push(OpenAIMessage::text("system", sys));
    }

    for msg in messages {
        result.extend(convert_message(msg));
    }

    result
}

/// Convert a single message; tool results become separate `tool` messages
fn convert_message(msg: Message) -> Vec<OpenAIMessage> {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    };

    match msg.content {
        Some(MessageContent::Text(text)) => vec![OpenAIMessage::text(role, text)],
        Some(MessageContent::Blocks(blocks)) => convert_blocks(role, blocks),
        None => vec![OpenAIMessage::text(role, String::new())],
    }
}

fn convert_blocks(role: &str, blocks: Vec<ContentBlock>) -> Vec<OpenAIMessage> {
    let mut messages = Vec::new();
    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => text_parts.push(text),
            ContentBlock::ToolUse { id, name, input } => {
                let arguments = serde_json::to_string(&input).unwrap_or_default();
                tool_calls.push(OpenAIToolCall {
                    id,
                    tool_type: "function".to_string(),
                    function: OpenAIFunctionCall { name, arguments },
                });
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => messages.push(OpenAIMessage {
                role: "tool".to_string(),
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(tool_use_id),
            }),
        }
    }

    if !text_parts.is_empty() || !tool_calls.is_empty() {
        messages.insert(
            0,
            OpenAIMessage {
                role: role.to_string(),
                content: (!text_parts.is_empty()).then(|| text_parts.join("\n")),
                tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                tool_call_id: None,
            },
        );
    }

    messages
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<OpenAITool> {
    tools
        .iter()
        .map(|tool| OpenAITool {
            tool_type: "function".to_string(),
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

fn parse_openai_response(msg: OpenAIResponseMessage) -> Result<Message> {
    let mut blocks = Vec::new();

    if let Some(content) = msg.content.filter(|c| !c.is_empty()) {
        blocks.push(ContentBlock::Text { text: content });
    }

    for call in msg.tool_calls.unwrap_or_default() {
        let input: serde_json::Value = if call.function.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(&call.function.arguments).map_err(|e| {
                LLMError::UnexpectedResponse(format!("Failed to parse tool arguments: {e}"))
            })?
        };

        blocks.push(ContentBlock::ToolUse {
            id: call.id,
            name: call.function.name,
            input,
        });
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: String::new(),
        });
    }

    Ok(Message {
        role: Role::Assistant,
        content: Some(MessageContent::Blocks(blocks)),
    })
}

fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "length" => StopReason::MaxTokens,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "stop" => StopReason::EndTurn,
        other => {
            debug!("Unmapped stop reason: {}", other);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
