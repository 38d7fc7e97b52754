//! Market data: price history, company profiles, news and fundamentals
//!
//! [`MarketData`] is the seam between the report pipeline and the data
//! provider; [`YahooMarketData`] is the production implementation.

mod yahoo;

pub use yahoo::YahooMarketData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Placeholder for absent profile fields
pub const NOT_AVAILABLE: &str = "N/A";

/// Market data failures
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// The provider returned nothing for the symbol
    #[error("No data available for {0}")]
    NoData(String),

    /// The provider does not know the symbol
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider-side failure
    #[error("Yahoo Finance error: {0}")]
    Provider(String),

    /// Cookie/crumb handshake failed
    #[error("Authentication with data provider failed: {0}")]
    Auth(String),

    /// Response did not have the expected shape
    #[error("Unexpected response: {0}")]
    Parse(String),
}

impl MarketDataError {
    /// Absent data rather than a failed request; callers skip these
    pub fn is_missing_data(&self) -> bool {
        matches!(self, Self::NoData(_) | Self::NotFound(_))
    }
}

/// Result type alias for market data calls
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Session timestamp
    pub date: DateTime<Utc>,
    /// Closing price
    pub close: f64,
}

/// Ordered daily closes of one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker symbol
    pub symbol: String,
    /// Closes in chronological order
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Whether the series has no closes
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in order
    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    /// Sum of day-over-day fractional changes
    ///
    /// Each step contributes `(c[i] - c[i-1]) / c[i-1]`; the steps are added,
    /// not compounded. Steps whose previous close is zero or whose result is
    /// not finite contribute nothing.
    pub fn pct_change_sum(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| {
                let (prev, next) = (w[0].close, w[1].close);
                if prev == 0.0 {
                    return 0.0;
                }
                let change = (next - prev) / prev;
                if change.is_finite() { change } else { 0.0 }
            })
            .sum()
    }
}

/// Company profile fields used by the research prompts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker symbol
    pub symbol: String,
    /// Full company name
    pub long_name: Option<String>,
    /// Sector
    pub sector: Option<String>,
    /// Market capitalisation in the listing currency
    pub market_cap: Option<u64>,
    /// Business summary
    pub summary: Option<String>,
}

impl CompanyProfile {
    /// Profile with every field absent
    pub fn unknown(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Company name or "N/A"
    pub fn name_or_na(&self) -> &str {
        self.long_name.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Sector or "N/A"
    pub fn sector_or_na(&self) -> &str {
        self.sector.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Market cap or "N/A"
    pub fn market_cap_or_na(&self) -> String {
        self.market_cap
            .map_or_else(|| NOT_AVAILABLE.to_string(), |cap| cap.to_string())
    }

    /// Summary or "N/A"
    pub fn summary_or_na(&self) -> &str {
        self.summary.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// A news headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Headline
    pub title: String,
    /// Publisher name
    pub publisher: Option<String>,
    /// Article URL
    pub link: Option<String>,
    /// Publication time
    pub published_at: Option<DateTime<Utc>>,
}

impl fmt::Display for NewsItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        if let Some(publisher) = &self.publisher {
            write!(f, " ({publisher})")?;
        }
        if let Some(link) = &self.link {
            write!(f, " <{link}>")?;
        }
        Ok(())
    }
}

/// Latest daily bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Analyst rating counts for one period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationTrend {
    /// Period label, e.g. "0m" for the current month
    pub period: String,
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

/// Valuation and financial health figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub profit_margins: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub target_mean_price: Option<f64>,
    pub recommendation_key: Option<String>,
}

/// Source of market data for a ticker symbol
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Daily closes over `range` (e.g. "1y")
    async fn price_history(&self, symbol: &str, range: &str) -> Result<PriceSeries>;

    /// Company profile fields
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile>;

    /// Up to `limit` recent news items
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>>;

    /// Latest daily bar
    async fn latest_quote(&self, symbol: &str) -> Result<Quote>;

    /// Analyst recommendation counts, most recent period first
    async fn recommendation_trend(&self, symbol: &str) -> Result<Vec<RecommendationTrend>>;

    /// Valuation and financial figures
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series(closes: &[f64]) -> PriceSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: Utc.timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0).unwrap(),
                close,
            })
            .collect();
        PriceSeries::new("TEST", points)
    }

    #[test]
    fn test_pct_change_sum_is_simple_sum() {
        // Steps of +2%, -1%, +3%
        let c0 = 100.0;
        let c1 = c0 * 1.02;
        let c2 = c1 * 0.99;
        let c3 = c2 * 1.03;
        let sum = series(&[c0, c1, c2, c3]).pct_change_sum();
        assert!((sum - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_pct_change_sum_edge_cases() {
        assert_eq!(series(&[]).pct_change_sum(), 0.0);
        assert_eq!(series(&[42.0]).pct_change_sum(), 0.0);
        // Zero previous close is skipped
        assert!((series(&[0.0, 10.0, 11.0]).pct_change_sum() - 0.1).abs() < 1e-9);
        assert!(!series(&[1.0]).is_empty());
    }

    #[test]
    fn test_profile_placeholders() {
        let profile = CompanyProfile::unknown("XYZ");
        assert_eq!(profile.name_or_na(), "N/A");
        assert_eq!(profile.sector_or_na(), "N/A");
        assert_eq!(profile.market_cap_or_na(), "N/A");
        assert_eq!(profile.summary_or_na(), "N/A");

        let profile = CompanyProfile {
            market_cap: Some(1_500_000),
            ..profile
        };
        assert_eq!(profile.market_cap_or_na(), "1500000");
    }

    #[test]
    fn test_missing_data_classification() {
        assert!(MarketDataError::NoData("A".to_string()).is_missing_data());
        assert!(MarketDataError::NotFound("A".to_string()).is_missing_data());
        assert!(!MarketDataError::Provider("boom".to_string()).is_missing_data());
    }

    #[test]
    fn test_news_display() {
        let item = NewsItem {
            title: "TCS wins deal".to_string(),
            publisher: Some("Reuters".to_string()),
            link: None,
            published_at: None,
        };
        assert_eq!(item.to_string(), "TCS wins deal (Reuters)");
    }
}
