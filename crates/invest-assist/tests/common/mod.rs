//! Fakes shared by the integration tests

#![allow(dead_code)]

use agent_llm::{CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use invest_assist::market::{
    CompanyProfile, Fundamentals, MarketData, MarketDataError, NewsItem, PricePoint, PriceSeries,
    Quote, RecommendationTrend,
};
use invest_assist::{AssistConfig, Services};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type MarketResult<T> = std::result::Result<T, MarketDataError>;

/// In-memory market data keyed by symbol
#[derive(Default)]
pub struct FakeMarket {
    closes: HashMap<String, Vec<f64>>,
    profiles: HashMap<String, CompanyProfile>,
}

impl FakeMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.closes.insert(symbol.to_string(), closes.to_vec());
        self
    }

    pub fn with_profile(mut self, symbol: &str, name: &str, sector: &str) -> Self {
        self.profiles.insert(
            symbol.to_string(),
            CompanyProfile {
                symbol: symbol.to_string(),
                long_name: Some(name.to_string()),
                sector: Some(sector.to_string()),
                market_cap: Some(1_000_000_000),
                summary: Some(format!("{name} makes things.")),
            },
        );
        self
    }
}

#[async_trait]
impl MarketData for FakeMarket {
    async fn price_history(&self, symbol: &str, _range: &str) -> MarketResult<PriceSeries> {
        let closes = self
            .closes
            .get(symbol)
            .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))?;
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + Duration::days(i as i64),
                close,
            })
            .collect();
        Ok(PriceSeries::new(symbol, points))
    }

    async fn profile(&self, symbol: &str) -> MarketResult<CompanyProfile> {
        self.profiles
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
    }

    async fn news(&self, symbol: &str, _limit: usize) -> MarketResult<Vec<NewsItem>> {
        if !self.profiles.contains_key(symbol) {
            return Err(MarketDataError::NotFound(symbol.to_string()));
        }
        Ok(vec![NewsItem {
            title: format!("{symbol} beats estimates"),
            publisher: Some("Wire".to_string()),
            link: Some(format!("https://news.example/{symbol}")),
            published_at: None,
        }])
    }

    async fn latest_quote(&self, symbol: &str) -> MarketResult<Quote> {
        let close = self
            .closes
            .get(symbol)
            .and_then(|c| c.last().copied())
            .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))?;
        Ok(Quote {
            symbol: symbol.to_string(),
            timestamp: Utc::now(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        })
    }

    async fn recommendation_trend(&self, _symbol: &str) -> MarketResult<Vec<RecommendationTrend>> {
        Ok(Vec::new())
    }

    async fn fundamentals(&self, symbol: &str) -> MarketResult<Fundamentals> {
        Ok(Fundamentals {
            symbol: symbol.to_string(),
            ..Default::default()
        })
    }
}

/// Answers every request with "<agent name>: <reply>" and records requests
#[derive(Default)]
pub struct EchoProvider {
    reply: String,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl EchoProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::default(),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Agent names in request order, read from the system prompt
    pub fn agents(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| agent_name(r).to_string())
            .collect()
    }

    pub fn last_user_text(&self) -> String {
        let requests = self.requests.lock().unwrap();
        requests
            .last()
            .and_then(|r| r.messages.last())
            .and_then(Message::text)
            .map(str::to_string)
            .unwrap_or_default()
    }
}

fn agent_name(request: &CompletionRequest) -> &str {
    request
        .system
        .as_deref()
        .and_then(|s| s.strip_prefix("You are "))
        .and_then(|s| s.split('.').next())
        .unwrap_or("unknown")
}

#[async_trait]
impl LLMProvider for EchoProvider {
    async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
        let text = format!("{}: {}", agent_name(&request), self.reply);
        self.requests.lock().unwrap().push(request);
        Ok(CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        "echo"
    }
}

pub fn test_config() -> AssistConfig {
    AssistConfig::builder()
        .api_key("test-key")
        .build()
        .unwrap()
}

pub fn services(provider: Arc<EchoProvider>, market: FakeMarket) -> Services {
    Services::with_parts(test_config(), provider, Arc::new(market)).unwrap()
}

pub fn sample_market() -> FakeMarket {
    FakeMarket::new()
        .with_closes("AAPL", &[100.0, 102.0, 100.98, 104.0094])
        .with_closes("TCS.NS", &[3900.0, 3950.0])
        .with_profile("AAPL", "Apple Inc.", "Technology")
        .with_profile("TCS.NS", "Tata Consultancy Services", "Technology")
}
