//! Stock investment assistant
//!
//! Two ways to ask about stocks:
//!
//! - **Report**: compare the one-year performance of several symbols, then
//!   run analyst, researcher, strategist and team-lead agents in sequence to
//!   produce a ranked investment report ([`ReportPipeline`]).
//! - **Chat**: a team of a web-search agent and a finance-tools agent answers
//!   free-form questions, streaming the reply ([`ChatAssistant`]).
//!
//! Both are served over HTTP by [`web`] and from the command line by the
//! `invest-assist` binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use invest_assist::{AssistConfig, Services, parse_symbols};
//!
//! let services = Services::from_config(AssistConfig::from_env()?)?;
//! let symbols = parse_symbols("AAPL, TSLA, TCS.NS")?;
//! let outcome = services.pipeline.final_report(&symbols).await?;
//! ```

pub mod app;
pub mod chart;
pub mod chat;
pub mod config;
pub mod error;
pub mod market;
pub mod markdown;
pub mod pipeline;
pub mod symbols;
pub mod tools;
pub mod web;

pub use app::Services;
pub use chat::{ChatAssistant, ChatSession, ChatState, SessionStore};
pub use config::AssistConfig;
pub use error::{AssistError, EMPTY_SYMBOLS_MESSAGE, Result};
pub use markdown::render_markdown;
pub use market::{MarketData, MarketDataError, YahooMarketData};
pub use pipeline::{InvestmentReport, ReportOutcome, ReportPipeline};
pub use symbols::{
    Exchange, detect_ticker, detect_ticker_with, detect_tickers, parse_symbols, substitute_pronoun,
};
