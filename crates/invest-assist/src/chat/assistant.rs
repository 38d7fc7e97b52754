use super::session::{ChatSession, PreparedTurn, ResponseBuffer};
use crate::error::Result;
use crate::market::MarketData;
use crate::tools::{finance_registry, web_search_registry};
use agent_core::{Agent, Context, TextStream};
use agent_runtime::{AgentProfile, AgentRuntime};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{info, warn};

/// Member that searches the web
pub fn web_search_agent_profile() -> AgentProfile {
    AgentProfile::new("Web Search Agent")
        .role("Search the web for information")
        .description("Searches the web for news, articles and general information.")
        .instructions(["Always include sources", "Use markdown"])
        .markdown(true)
}

/// Member with the finance tools
pub fn finance_agent_profile() -> AgentProfile {
    AgentProfile::new("Finance AI Agent")
        .role("Get stock prices, analyst recommendations, fundamentals and company news")
        .description("Looks up market data for stock tickers.")
        .instruction("Use tables to display the data")
        .markdown(true)
}

/// Leader that delegates to the two members
pub fn lead_profile() -> AgentProfile {
    AgentProfile::new("Finance & Web Assistant")
        .description("Answers questions about stocks, analyst recommendations, investment strategies and market news.")
        .instructions([
            "Use markdown",
            "Always include sources",
            "Avoid repeating previous tasks",
            "Use tables to display the data",
        ])
        .markdown(true)
}

/// Drives chat turns through the assistant team
#[derive(Clone)]
pub struct ChatAssistant {
    agent: Arc<dyn Agent>,
}

impl ChatAssistant {
    /// Wrap any agent
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }

    /// Build the web search + finance team
    ///
    /// Tavily is added to the web tools only when `tavily_api_key` is set.
    pub fn build(
        runtime: &AgentRuntime,
        market: Arc<dyn MarketData>,
        tavily_api_key: Option<String>,
        news_limit: usize,
    ) -> Result<Self> {
        if tavily_api_key.is_none() {
            warn!("TAVILY_API_KEY not set; web search uses DuckDuckGo only");
        }
        let web = runtime.create_tool_agent(web_search_agent_profile(), web_search_registry(tavily_api_key)?);
        let finance = runtime.create_tool_agent(finance_agent_profile(), finance_registry(market, news_limit));

        let team = runtime
            .team(lead_profile())
            .member(Arc::new(web))
            .member(Arc::new(finance))
            .build()?;
        info!(members = ?team.member_names(), "Chat team ready");

        Ok(Self::new(Arc::new(team)))
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    /// Start streaming the reply for a prepared turn
    pub async fn stream_turn(&self, turn: PreparedTurn, session_id: &str) -> Result<TextStream> {
        let mut context = Context::new()
            .with_session_id(session_id)
            .with_history(turn.history);
        Ok(self.agent.process_stream(turn.message, &mut context).await?)
    }

    /// Run one full turn on `session`
    ///
    /// `on_chunk` receives every chunk as it arrives together with the reply
    /// text so far. On failure the session goes idle without an assistant turn.
    pub async fn respond<F>(&self, session: &mut ChatSession, input: &str, mut on_chunk: F) -> Result<String>
    where
        F: FnMut(&str, &str) + Send,
    {
        let turn = session.begin_turn(input)?;
        let mut stream = match self.stream_turn(turn, session.id()).await {
            Ok(stream) => stream,
            Err(e) => {
                session.abort_turn(&e.to_string());
                return Err(e);
            }
        };

        let mut buffer = ResponseBuffer::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    let so_far = buffer.push(&chunk);
                    on_chunk(&chunk, so_far);
                }
                Err(e) => {
                    session.abort_turn(&e.to_string());
                    return Err(e.into());
                }
            }
        }

        session.finish_turn(buffer.text())?;
        Ok(buffer.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatState;
    use crate::error::AssistError;
    use async_trait::async_trait;
    use futures::stream;
    use std::sync::Mutex;

    /// Streams fixed chunks and records what it was asked
    struct Chunked {
        chunks: Vec<&'static str>,
        fail_after: Option<usize>,
        seen: Mutex<Vec<(String, usize)>>,
    }

    impl Chunked {
        fn new(chunks: Vec<&'static str>) -> Self {
            Self {
                chunks,
                fail_after: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Agent for Chunked {
        async fn process(&self, _input: String, _context: &mut Context) -> agent_core::Result<String> {
            Ok(self.chunks.concat())
        }

        async fn process_stream(&self, input: String, context: &mut Context) -> agent_core::Result<TextStream> {
            self.seen.lock().unwrap().push((input, context.history().len()));
            let mut items: Vec<agent_core::Result<String>> =
                self.chunks.iter().map(|c| Ok((*c).to_string())).collect();
            if let Some(n) = self.fail_after {
                items.truncate(n);
                items.push(Err(agent_core::Error::Backend("rate limited".to_string())));
            }
            Ok(stream::iter(items).boxed())
        }

        fn name(&self) -> &str {
            "chunked"
        }
    }

    #[tokio::test]
    async fn test_displayed_text_is_concatenation() {
        let agent = Arc::new(Chunked::new(vec!["| Ticker |", " Price |\n", "| NVDA | 120 |"]));
        let assistant = ChatAssistant::new(agent.clone());
        let mut session = ChatSession::new("s1");

        let mut rendered = Vec::new();
        let reply = assistant
            .respond(&mut session, "Price of NVDA", |_, so_far| rendered.push(so_far.to_string()))
            .await
            .unwrap();

        assert_eq!(reply, "| Ticker | Price |\n| NVDA | 120 |");
        assert_eq!(rendered.last().unwrap(), &reply);
        assert_eq!(rendered.len(), 3);
        assert_eq!(session.history()[1].content, reply);
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_history_and_pronoun_forwarded() {
        let agent = Arc::new(Chunked::new(vec!["ok"]));
        let assistant = ChatAssistant::new(agent.clone());
        let mut session = ChatSession::new("s1");

        assistant.respond(&mut session, "News on TCS.NS", |_, _| {}).await.unwrap();
        assistant
            .respond(&mut session, "How is its recommendation?", |_, _| {})
            .await
            .unwrap();

        let seen = agent.seen.lock().unwrap();
        assert_eq!(seen[1].0, "How is TCS.NS recommendation?");
        assert_eq!(seen[1].1, 2);
    }

    #[tokio::test]
    async fn test_stream_error_returns_to_idle() {
        let mut agent = Chunked::new(vec!["partial", "never"]);
        agent.fail_after = Some(1);
        let assistant = ChatAssistant::new(Arc::new(agent));
        let mut session = ChatSession::new("s1");

        let err = assistant
            .respond(&mut session, "Fundamentals of AAPL", |_, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, AssistError::Agent(_)));
        assert_eq!(session.state(), ChatState::Idle);
        assert_eq!(session.history().len(), 1);
    }
}
