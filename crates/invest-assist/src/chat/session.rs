//! One chat conversation: transcript, tracked ticker and turn state

use crate::error::{AssistError, Result};
use crate::symbols::{detect_tickers, substitute_pronoun};
use agent_core::ConversationTurn;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Where a session is in its request/response cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    /// Fresh session, nothing asked yet
    AwaitingInput,
    /// A reply is being streamed
    StreamingResponse,
    /// Last reply finished (or failed)
    Idle,
}

impl ChatState {
    pub fn accepts_input(self) -> bool {
        !matches!(self, Self::StreamingResponse)
    }
}

/// A user message ready to send, with the transcript that precedes it
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    /// Message after pronoun substitution
    pub message: String,
    /// Transcript before this message
    pub history: Vec<ConversationTurn>,
}

/// Per-session chat state
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    id: String,
    history: Vec<ConversationTurn>,
    last_symbol: Option<String>,
    #[serde(skip)]
    seen_symbols: Vec<String>,
    state: ChatState,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            history: Vec::new(),
            last_symbol: None,
            seen_symbols: Vec::new(),
            state: ChatState::AwaitingInput,
            created_at: now,
            last_active: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn last_symbol(&self) -> Option<&str> {
        self.last_symbol.as_deref()
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Accept a user message and enter [`ChatState::StreamingResponse`]
    ///
    /// "its" is replaced with the last ticker seen, then the message is
    /// scanned for a new ticker. The stored user turn is the rewritten text.
    pub fn begin_turn(&mut self, input: &str) -> Result<PreparedTurn> {
        if !self.state.accepts_input() {
            return Err(AssistError::Busy);
        }
        let input = input.trim();
        if input.is_empty() {
            return Err(AssistError::EmptyMessage);
        }

        let message = match &self.last_symbol {
            Some(symbol) => substitute_pronoun(input, symbol),
            None => input.to_string(),
        };
        let found = detect_tickers(&message, &self.seen_symbols);
        for symbol in &found {
            if !self.seen_symbols.contains(symbol) {
                self.seen_symbols.push(symbol.clone());
            }
        }
        if let Some(symbol) = found.last() {
            debug!(session = %self.id, %symbol, "Tracking ticker");
            self.last_symbol = Some(symbol.clone());
        }

        let history = self.history.clone();
        self.history.push(ConversationTurn::user(message.clone()));
        self.state = ChatState::StreamingResponse;
        self.last_active = Utc::now();

        Ok(PreparedTurn { message, history })
    }

    /// Record the completed reply and go idle
    pub fn finish_turn(&mut self, reply: impl Into<String>) -> Result<()> {
        if self.state != ChatState::StreamingResponse {
            return Err(AssistError::NoActiveTurn);
        }
        self.history.push(ConversationTurn::assistant(reply));
        self.state = ChatState::Idle;
        self.last_active = Utc::now();
        Ok(())
    }

    /// Give up on the current reply; the user turn stays in the transcript
    pub fn abort_turn(&mut self, reason: &str) {
        if self.state == ChatState::StreamingResponse {
            debug!(session = %self.id, reason, "Turn aborted");
            self.state = ChatState::Idle;
            self.last_active = Utc::now();
        }
    }
}

/// Reply text accumulated chunk by chunk
#[derive(Debug, Default, Clone)]
pub struct ResponseBuffer {
    text: String,
    chunks: usize,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the text so far
    pub fn push(&mut self, chunk: &str) -> &str {
        self.text.push_str(chunk);
        self.chunks += 1;
        &self.text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::TurnRole;

    #[test]
    fn test_pronoun_uses_previous_ticker() {
        let mut session = ChatSession::new("s1");
        session.begin_turn("Tell me about TCS.NS").unwrap();
        session.finish_turn("TCS is an IT company").unwrap();

        let turn = session.begin_turn("How is its recommendation?").unwrap();
        assert_eq!(turn.message, "How is TCS.NS recommendation?");
        assert_eq!(turn.history.len(), 2);
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.last_symbol(), Some("TCS.NS"));
    }

    #[test]
    fn test_pronoun_after_lowercase_ticker() {
        let mut session = ChatSession::new("s1");
        session.begin_turn("Tell me about nvda").unwrap();
        session.finish_turn("NVIDIA designs GPUs").unwrap();
        assert_eq!(session.last_symbol(), Some("NVDA"));

        let turn = session.begin_turn("How is its price?").unwrap();
        assert_eq!(turn.message, "How is NVDA price?");
    }

    #[test]
    fn test_seen_symbol_matches_in_lowercase() {
        let mut session = ChatSession::new("s1");
        session.begin_turn("Compare TSLA with AAPL").unwrap();
        session.finish_turn("...").unwrap();
        assert_eq!(session.last_symbol(), Some("AAPL"));

        session.begin_turn("is tsla still ahead?").unwrap();
        assert_eq!(session.last_symbol(), Some("TSLA"));
    }

    #[test]
    fn test_no_substitution_without_ticker() {
        let mut session = ChatSession::new("s1");
        let turn = session.begin_turn("what is its outlook?").unwrap();
        assert_eq!(turn.message, "what is its outlook?");
        assert_eq!(session.last_symbol(), None);
    }

    #[test]
    fn test_latest_ticker_wins() {
        let mut session = ChatSession::new("s1");
        session.begin_turn("Compare NVDA with AAPL").unwrap();
        session.finish_turn("...").unwrap();
        assert_eq!(session.last_symbol(), Some("AAPL"));

        session.begin_turn("and the news?").unwrap();
        assert_eq!(session.last_symbol(), Some("AAPL"));
    }

    #[test]
    fn test_state_transitions() {
        let mut session = ChatSession::new("s1");
        assert_eq!(session.state(), ChatState::AwaitingInput);

        session.begin_turn("hello").unwrap();
        assert_eq!(session.state(), ChatState::StreamingResponse);
        assert!(matches!(session.begin_turn("again"), Err(AssistError::Busy)));

        session.finish_turn("hi there").unwrap();
        assert_eq!(session.state(), ChatState::Idle);
        assert_eq!(session.history()[1].role, TurnRole::Assistant);
        assert!(matches!(session.finish_turn("x"), Err(AssistError::NoActiveTurn)));
    }

    #[test]
    fn test_abort_keeps_user_turn() {
        let mut session = ChatSession::new("s1");
        session.begin_turn("price of INFY.NS").unwrap();
        session.abort_turn("backend down");

        assert_eq!(session.state(), ChatState::Idle);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, TurnRole::User);
    }

    #[test]
    fn test_empty_message_rejected() {
        let mut session = ChatSession::new("s1");
        assert!(matches!(session.begin_turn("   "), Err(AssistError::EmptyMessage)));
        assert_eq!(session.state(), ChatState::AwaitingInput);
    }

    #[test]
    fn test_response_buffer() {
        let mut buffer = ResponseBuffer::new();
        assert_eq!(buffer.push("NVDA "), "NVDA ");
        assert_eq!(buffer.push("looks strong"), "NVDA looks strong");
        assert_eq!(buffer.chunks(), 2);
        assert_eq!(buffer.into_text(), "NVDA looks strong");
    }
}
