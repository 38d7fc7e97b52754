//! One-year performance comparison

use crate::market::{MarketData, MarketDataError, PriceSeries};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument, warn};

/// Performance of one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolPerformance {
    /// Ticker symbol
    pub symbol: String,
    /// Sum of day-over-day fractional changes
    pub change_sum: f64,
    /// The closes the figure was computed from
    pub series: PriceSeries,
}

/// Symbols with data, in input order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    entries: Vec<SymbolPerformance>,
}

impl Performance {
    /// Whether no symbol had data
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of symbols with data
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Change sum for a symbol
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.change_sum)
    }

    /// Entries in input order
    pub fn entries(&self) -> &[SymbolPerformance] {
        &self.entries
    }

    /// Price series of every symbol with data
    pub fn series(&self) -> impl Iterator<Item = &PriceSeries> {
        self.entries.iter().map(|e| &e.series)
    }

    fn push(&mut self, series: PriceSeries) {
        let change_sum = series.pct_change_sum();
        self.entries.push(SymbolPerformance {
            symbol: series.symbol.clone(),
            change_sum,
            series,
        });
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{}: {:.4} ({:+.2}%)",
                entry.symbol,
                entry.change_sum,
                entry.change_sum * 100.0
            )?;
        }
        Ok(())
    }
}

/// Fetch each symbol's history and sum its daily changes
///
/// Symbols without data are skipped; other failures abort.
#[instrument(skip(market))]
pub async fn compare_performance(
    market: &dyn MarketData,
    symbols: &[String],
    range: &str,
) -> Result<Performance, MarketDataError> {
    let mut performance = Performance::default();

    for symbol in symbols {
        match market.price_history(symbol, range).await {
            Ok(series) if series.is_empty() => {
                warn!(%symbol, "No price data found, skipping");
            }
            Ok(series) => performance.push(series),
            Err(e) if e.is_missing_data() => {
                warn!(%symbol, error = %e, "No price data found, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        requested = symbols.len(),
        with_data = performance.len(),
        "Performance comparison complete"
    );
    Ok(performance)
}
