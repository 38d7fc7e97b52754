//! Finance tools over the market data source

use crate::market::{MarketData, MarketDataError};
use crate::symbols::Exchange;
use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SymbolParams {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct NewsParams {
    symbol: String,
    #[serde(default)]
    limit: Option<usize>,
}

fn parse<T: for<'de> Deserialize<'de>>(tool: &str, params: Value) -> AgentResult<T> {
    serde_json::from_value(params).map_err(|e| agent_core::Error::ToolFailed {
        tool: tool.to_string(),
        reason: format!("Invalid parameters: {e}"),
    })
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

fn tool_error(tool: &str, err: MarketDataError) -> agent_core::Error {
    agent_core::Error::ToolFailed {
        tool: tool.to_string(),
        reason: err.to_string(),
    }
}

fn symbol_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "Ticker symbol; append .NS for NSE or .BO for BSE listings (e.g. 'NVDA', 'TCS.NS')"
            }
        },
        "required": ["symbol"]
    })
}

/// Latest daily price bar
pub struct StockPriceTool {
    market: Arc<dyn MarketData>,
}

impl StockPriceTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse(self.name(), params)?;
        let symbol = normalize(&params.symbol);
        let quote = self
            .market
            .latest_quote(&symbol)
            .await
            .map_err(|e| tool_error(self.name(), e))?;
        let exchange = Exchange::from_symbol(&symbol);

        Ok(json!({
            "symbol": symbol,
            "exchange": exchange.to_string(),
            "currency": exchange.currency(),
            "price": quote.close,
            "open": quote.open,
            "high": quote.high,
            "low": quote.low,
            "volume": quote.volume,
            "timestamp": quote.timestamp.to_rfc3339(),
        }))
    }

    fn name(&self) -> &str {
        "stock_price"
    }

    fn description(&self) -> &str {
        "Get the current stock price for a ticker symbol, with the day's open, high, low and volume."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

/// Analyst rating counts
pub struct AnalystRecommendationsTool {
    market: Arc<dyn MarketData>,
}

impl AnalystRecommendationsTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for AnalystRecommendationsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse(self.name(), params)?;
        let symbol = normalize(&params.symbol);
        let trend = self
            .market
            .recommendation_trend(&symbol)
            .await
            .map_err(|e| tool_error(self.name(), e))?;

        Ok(json!({ "symbol": symbol, "recommendations": trend }))
    }

    fn name(&self) -> &str {
        "analyst_recommendations"
    }

    fn description(&self) -> &str {
        "Get analyst recommendation counts (strong buy, buy, hold, sell, strong sell) for recent months."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

/// Valuation and financial figures
pub struct StockFundamentalsTool {
    market: Arc<dyn MarketData>,
}

impl StockFundamentalsTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for StockFundamentalsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SymbolParams = parse(self.name(), params)?;
        let symbol = normalize(&params.symbol);
        let fundamentals = self
            .market
            .fundamentals(&symbol)
            .await
            .map_err(|e| tool_error(self.name(), e))?;

        let mut value = serde_json::to_value(&fundamentals).map_err(|e| {
            agent_core::Error::ToolFailed {
                tool: self.name().to_string(),
                reason: e.to_string(),
            }
        })?;
        value["currency"] = json!(Exchange::from_symbol(&symbol).currency());
        Ok(value)
    }

    fn name(&self) -> &str {
        "stock_fundamentals"
    }

    fn description(&self) -> &str {
        "Get fundamental data: market cap, P/E, price to book, EPS, dividend yield, margins, growth and 52-week range."
    }

    fn input_schema(&self) -> Value {
        symbol_schema()
    }
}

/// Recent news headlines
pub struct CompanyNewsTool {
    market: Arc<dyn MarketData>,
    max_items: usize,
}

impl CompanyNewsTool {
    pub fn new(market: Arc<dyn MarketData>, max_items: usize) -> Self {
        Self { market, max_items }
    }
}

#[async_trait]
impl Tool for CompanyNewsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: NewsParams = parse(self.name(), params)?;
        let symbol = normalize(&params.symbol);
        let limit = params.limit.unwrap_or(self.max_items).clamp(1, self.max_items.max(1));
        let news = self
            .market
            .news(&symbol, limit)
            .await
            .map_err(|e| tool_error(self.name(), e))?;

        Ok(json!({ "symbol": symbol, "news": news }))
    }

    fn name(&self) -> &str {
        "company_news"
    }

    fn description(&self) -> &str {
        "Get the latest news headlines with links about a company."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Ticker symbol (e.g. 'AAPL', 'INFY.NS')"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of headlines to return",
                    "minimum": 1
                }
            },
            "required": ["symbol"]
        })
    }
}
