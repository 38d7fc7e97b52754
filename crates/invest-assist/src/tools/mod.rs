//! Tools for the chat agents
//!
//! - Finance tools read from a [`MarketData`](crate::market::MarketData)
//!   source: latest price, analyst recommendations, fundamentals, news
//! - Web search tools query DuckDuckGo and, with a key, Tavily

mod finance;
mod web_search;

pub use finance::{AnalystRecommendationsTool, CompanyNewsTool, StockFundamentalsTool, StockPriceTool};
pub use web_search::{DuckDuckGoSearchTool, TavilySearchTool};

use crate::market::MarketData;
use agent_tools::ToolRegistry;
use std::sync::Arc;

/// Registry with the four finance tools
pub fn finance_registry(market: Arc<dyn MarketData>, news_limit: usize) -> Arc<ToolRegistry> {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(StockPriceTool::new(market.clone())));
    registry.register(Arc::new(AnalystRecommendationsTool::new(market.clone())));
    registry.register(Arc::new(StockFundamentalsTool::new(market.clone())));
    registry.register(Arc::new(CompanyNewsTool::new(market, news_limit)));
    Arc::new(registry)
}

/// Registry with DuckDuckGo, plus Tavily when a key is given
pub fn web_search_registry(tavily_api_key: Option<String>) -> agent_core::Result<Arc<ToolRegistry>> {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(DuckDuckGoSearchTool::new()?));
    if let Some(key) = tavily_api_key {
        registry.register(Arc::new(TavilySearchTool::new(key)?));
    }
    Ok(Arc::new(registry))
}
