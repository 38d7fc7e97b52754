//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, ContentBlock, Result, StopReason};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

/// One event of a streamed completion
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A text fragment, in generation order
    Text(String),
    /// A fully assembled tool call
    ToolUse {
        /// Tool call ID
        id: String,
        /// Tool name
        name: String,
        /// Parsed tool arguments
        input: serde_json::Value,
    },
    /// Generation finished
    Stop(StopReason),
}

/// Events of one streamed completion
pub type LLMEventStream = BoxStream<'static, Result<StreamEvent>>;

/// Trait for LLM providers
///
/// Implementations of this trait provide access to different LLM services.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Generate a completion as a stream of events
    ///
    /// Providers without native streaming fall back to [`LLMProvider::complete`]
    /// and replay the response as events: the text first, then tool calls,
    /// then the stop reason.
    async fn stream(&self, request: CompletionRequest) -> Result<LLMEventStream> {
        let response = self.complete(request).await?;
        Ok(stream::iter(response_events(&response).into_iter().map(Ok)).boxed())
    }

    /// Get the provider name (e.g., "groq", "gemini")
    fn name(&self) -> &str;
}

/// Flatten a complete response into stream events
pub fn response_events(response: &CompletionResponse) -> Vec<StreamEvent> {
    let mut events = Vec::new();
    if let Some(text) = response.message.text().filter(|t| !t.is_empty()) {
        events.push(StreamEvent::Text(text.to_string()));
    }
    for block in response.message.tool_uses() {
        if let ContentBlock::ToolUse { id, name, input } = block {
            events.push(StreamEvent::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            });
        }
    }
    events.push(StreamEvent::Stop(response.stop_reason));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, MessageContent, Role, TokenUsage};

    #[test]
    fn test_response_events_order() {
        let response = CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![
                    ContentBlock::Text {
                        text: "Looking up".to_string(),
                    },
                    ContentBlock::ToolUse {
                        id: "call_1".to_string(),
                        name: "stock_price".to_string(),
                        input: serde_json::json!({"symbol": "AAPL"}),
                    },
                ])),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };

        let events = response_events(&response);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], StreamEvent::Text("Looking up".to_string()));
        assert!(matches!(&events[1], StreamEvent::ToolUse { name, .. } if name == "stock_price"));
        assert_eq!(events[2], StreamEvent::Stop(StopReason::ToolUse));
    }

    struct Fixed;

    #[async_trait]
    impl LLMProvider for Fixed {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                message: Message::assistant("NVDA closed higher"),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_default_stream_replays_completion() {
        let events: Vec<StreamEvent> = tokio_test::block_on(async {
            let stream = Fixed.stream(CompletionRequest::builder("m").build()).await.unwrap();
            stream.map(|e| e.unwrap()).collect().await
        });

        assert_eq!(
            events,
            vec![
                StreamEvent::Text("NVDA closed higher".to_string()),
                StreamEvent::Stop(StopReason::EndTurn),
            ]
        );
    }
}
