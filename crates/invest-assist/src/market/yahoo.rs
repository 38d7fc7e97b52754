//! Yahoo Finance market data client
//!
//! Price history and quotes go through `yahoo_finance_api`. Profiles,
//! fundamentals and analyst trends come from the quoteSummary endpoint,
//! which needs a session cookie plus a crumb token; news comes from the
//! search endpoint.

use super::{
    CompanyProfile, Fundamentals, MarketData, MarketDataError, NewsItem, PricePoint, PriceSeries,
    Quote, RecommendationTrend, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};
use yahoo_finance_api as yahoo;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const REFERER: &str = "https://finance.yahoo.com/";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Yahoo Finance implementation of [`MarketData`]
pub struct YahooMarketData {
    connector: yahoo::YahooConnector,
    http: Client,
    crumb: Mutex<Option<String>>,
}

impl YahooMarketData {
    /// Create a client with its own cookie jar
    pub fn new() -> Result<Self> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::Provider(e.to_string()))?;
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            connector,
            http,
            crumb: Mutex::new(None),
        })
    }

    /// Current crumb, running the cookie/crumb handshake when none is cached
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // The cookie response itself is usually a 404; only the Set-Cookie matters
        self.http
            .get(COOKIE_URL)
            .header("referer", REFERER)
            .send()
            .await
            .map_err(|e| MarketDataError::Auth(format!("cookie request failed: {e}")))?;

        for endpoint in CRUMB_URLS {
            let response = match self.http.get(endpoint).header("referer", REFERER).send().await {
                Ok(response) if response.status().is_success() => response,
                Ok(response) => {
                    debug!(endpoint, status = %response.status(), "Crumb endpoint refused");
                    continue;
                }
                Err(e) => {
                    debug!(endpoint, error = %e, "Crumb endpoint unreachable");
                    continue;
                }
            };

            let body = response.text().await?;
            if let Some(crumb) = valid_crumb(&body) {
                *cached = Some(crumb.clone());
                return Ok(crumb);
            }
        }

        Err(MarketDataError::Auth(
            "no crumb returned by any endpoint".to_string(),
        ))
    }

    /// Fetch quoteSummary modules for a symbol
    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<Value> {
        let crumb = self.crumb().await?;
        let url = format!(
            "{SUMMARY_URL}/{}?modules={modules}&crumb={}",
            urlencoding::encode(symbol),
            urlencoding::encode(&crumb)
        );

        let response = self.http.get(&url).header("referer", REFERER).send().await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND => return Err(MarketDataError::NotFound(symbol.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                // Force a fresh handshake on the next call
                self.crumb.lock().await.take();
                return Err(MarketDataError::Auth(format!("quoteSummary returned {status}")));
            }
            s if !s.is_success() => {
                return Err(MarketDataError::Provider(format!("quoteSummary returned {s}")));
            }
            _ => {}
        }

        let body: Value = response.json().await?;
        summary_result(&body, symbol)
    }
}

#[async_trait]
impl MarketData for YahooMarketData {
    #[instrument(skip(self))]
    async fn price_history(&self, symbol: &str, range: &str) -> Result<PriceSeries> {
        let response = self
            .connector
            .get_quote_range(symbol, "1d", range)
            .await
            .map_err(|e| classify_connector_error(symbol, e))?;

        let quotes = response
            .quotes()
            .map_err(|_| MarketDataError::NoData(symbol.to_string()))?;

        let points: Vec<PricePoint> = quotes
            .iter()
            .filter(|q| q.close.is_finite())
            .filter_map(|q| {
                DateTime::from_timestamp(q.timestamp as i64, 0).map(|date| PricePoint {
                    date,
                    close: q.close,
                })
            })
            .collect();

        if points.is_empty() {
            return Err(MarketDataError::NoData(symbol.to_string()));
        }

        debug!(symbol, closes = points.len(), "Fetched price history");
        Ok(PriceSeries::new(symbol, points))
    }

    #[instrument(skip(self))]
    async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let summary = self.quote_summary(symbol, "price,assetProfile").await?;

        Ok(CompanyProfile {
            symbol: symbol.to_string(),
            long_name: text_at(&summary, &["price", "longName"])
                .or_else(|| text_at(&summary, &["price", "shortName"])),
            sector: text_at(&summary, &["assetProfile", "sector"]),
            market_cap: raw_at(&summary, &["price", "marketCap"])
                .filter(|cap| *cap >= 0.0)
                .map(|cap| cap.round() as u64),
            summary: text_at(&summary, &["assetProfile", "longBusinessSummary"]),
        })
    }

    #[instrument(skip(self))]
    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let limit_param = limit.to_string();
        let body: Value = self
            .http
            .get(SEARCH_URL)
            .header("referer", REFERER)
            .query(&[
                ("q", symbol),
                ("newsCount", limit_param.as_str()),
                ("quotesCount", "0"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_news(&body, limit))
    }

    #[instrument(skip(self))]
    async fn latest_quote(&self, symbol: &str) -> Result<Quote> {
        let response = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| classify_connector_error(symbol, e))?;

        let quote = response
            .last_quote()
            .map_err(|_| MarketDataError::NoData(symbol.to_string()))?;

        Ok(Quote {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0).unwrap_or_else(Utc::now),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
        })
    }

    #[instrument(skip(self))]
    async fn recommendation_trend(&self, symbol: &str) -> Result<Vec<RecommendationTrend>> {
        let summary = self.quote_summary(symbol, "recommendationTrend").await?;
        let trends = parse_trends(&summary);
        if trends.is_empty() {
            return Err(MarketDataError::NoData(symbol.to_string()));
        }
        Ok(trends)
    }

    #[instrument(skip(self))]
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let summary = self
            .quote_summary(
                symbol,
                "summaryDetail,defaultKeyStatistics,financialData",
            )
            .await?;

        Ok(parse_fundamentals(&summary, symbol))
    }
}

/// Unknown or delisted tickers come back as a chart error, not an HTTP failure
fn classify_connector_error(symbol: &str, err: yahoo::YahooError) -> MarketDataError {
    match err {
        yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes => {
            MarketDataError::NoData(symbol.to_string())
        }
        yahoo::YahooError::ApiError(ref msg)
            if reports_missing_symbol(msg.code.as_deref(), msg.description.as_deref()) =>
        {
            debug!(symbol, error = %err, "Symbol unknown to chart endpoint");
            MarketDataError::NotFound(symbol.to_string())
        }
        yahoo::YahooError::FetchFailed(msg) if msg.contains("404") => {
            MarketDataError::NotFound(symbol.to_string())
        }
        other => {
            warn!(symbol, error = %other, "Price request failed");
            MarketDataError::Provider(other.to_string())
        }
    }
}

fn reports_missing_symbol(code: Option<&str>, description: Option<&str>) -> bool {
    let code = code.unwrap_or_default().to_ascii_lowercase();
    let description = description.unwrap_or_default().to_ascii_lowercase();
    code == "not found"
        || ["not found", "no data", "delisted"]
            .iter()
            .any(|needle| description.contains(needle))
}

/// A crumb is a short token; HTML pages and rate-limit notices are rejected
fn valid_crumb(body: &str) -> Option<String> {
    let body = body.trim();
    let looks_valid = !body.is_empty()
        && body.len() < 100
        && !body.contains(' ')
        && !body.contains('<');
    looks_valid.then(|| body.to_string())
}

/// First entry of `quoteSummary.result`, or the matching error
fn summary_result(body: &Value, symbol: &str) -> Result<Value> {
    let summary = &body["quoteSummary"];
    if let Some(description) = summary["error"]["description"].as_str() {
        return Err(if description.to_ascii_lowercase().contains("not found") {
            MarketDataError::NotFound(symbol.to_string())
        } else {
            MarketDataError::Provider(description.to_string())
        });
    }

    summary["result"]
        .get(0)
        .cloned()
        .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))
}

fn value_at<'a>(value: &'a Value, path: &[&str]) -> &'a Value {
    path.iter().fold(value, |v, key| &v[*key])
}

/// Numeric field that may be wrapped as `{"raw": .., "fmt": ..}`
fn raw_at(value: &Value, path: &[&str]) -> Option<f64> {
    let field = value_at(value, path);
    field["raw"].as_f64().or_else(|| field.as_f64())
}

fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    value_at(value, path)
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_news(body: &Value, limit: usize) -> Vec<NewsItem> {
    body["news"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let title = text_at(item, &["title"])?;
                    Some(NewsItem {
                        title,
                        publisher: text_at(item, &["publisher"]),
                        link: text_at(item, &["link"]),
                        published_at: item["providerPublishTime"]
                            .as_i64()
                            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
                    })
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_trends(summary: &Value) -> Vec<RecommendationTrend> {
    let count = |item: &Value, key: &str| item[key].as_u64().unwrap_or(0) as u32;

    summary["recommendationTrend"]["trend"]
        .as_array()
        .map(|trend| {
            trend
                .iter()
                .map(|item| RecommendationTrend {
                    period: text_at(item, &["period"]).unwrap_or_default(),
                    strong_buy: count(item, "strongBuy"),
                    buy: count(item, "buy"),
                    hold: count(item, "hold"),
                    sell: count(item, "sell"),
                    strong_sell: count(item, "strongSell"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_fundamentals(summary: &Value, symbol: &str) -> Fundamentals {
    Fundamentals {
        symbol: symbol.to_string(),
        market_cap: raw_at(summary, &["summaryDetail", "marketCap"]),
        trailing_pe: raw_at(summary, &["summaryDetail", "trailingPE"]),
        forward_pe: raw_at(summary, &["summaryDetail", "forwardPE"]),
        price_to_book: raw_at(summary, &["defaultKeyStatistics", "priceToBook"]),
        trailing_eps: raw_at(summary, &["defaultKeyStatistics", "trailingEps"]),
        dividend_yield: raw_at(summary, &["summaryDetail", "dividendYield"]),
        profit_margins: raw_at(summary, &["financialData", "profitMargins"]),
        revenue_growth: raw_at(summary, &["financialData", "revenueGrowth"]),
        return_on_equity: raw_at(summary, &["financialData", "returnOnEquity"]),
        debt_to_equity: raw_at(summary, &["financialData", "debtToEquity"]),
        fifty_two_week_high: raw_at(summary, &["summaryDetail", "fiftyTwoWeekHigh"]),
        fifty_two_week_low: raw_at(summary, &["summaryDetail", "fiftyTwoWeekLow"]),
        target_mean_price: raw_at(summary, &["financialData", "targetMeanPrice"]),
        recommendation_key: text_at(summary, &["financialData", "recommendationKey"]),
    }
}
