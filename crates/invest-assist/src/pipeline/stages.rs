//! Report stages and the orchestrating pipeline

use super::comparator::{Performance, compare_performance};
use super::personas::PipelineAgents;
use super::prompts;
use crate::error::Result;
use crate::market::{CompanyProfile, MarketData};
use agent_core::{Agent, Context};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Message returned when no symbol has price data
pub const NO_DATA_MESSAGE: &str = "No data available for the provided stock symbols.";

/// Narrative analysis of one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    /// Ticker symbol
    pub symbol: String,
    /// Profile the analysis was based on
    pub profile: CompanyProfile,
    /// Agent output
    pub analysis: String,
}

/// Every intermediate result plus the final report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentReport {
    /// Symbols as requested
    pub symbols: Vec<String>,
    /// Performance of symbols with data
    pub performance: Performance,
    /// Market analysis stage output
    pub market_analysis: String,
    /// Company analysis stage output, in symbol order
    pub companies: Vec<CompanyAnalysis>,
    /// Recommendation stage output
    pub recommendations: String,
    /// Final report (markdown)
    pub report: String,
}

/// Result of a report run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// No symbol had data; no agent was called
    NoData {
        /// User-facing message
        message: String,
    },
    /// Full report
    Report(InvestmentReport),
}

/// Runs the report stages against one data source and four agents
#[derive(Clone)]
pub struct ReportPipeline {
    market: Arc<dyn MarketData>,
    agents: PipelineAgents,
    range: String,
    news_limit: usize,
}

impl ReportPipeline {
    /// Create a pipeline with a one-year lookback and five news items
    pub fn new(market: Arc<dyn MarketData>, agents: PipelineAgents) -> Self {
        Self {
            market,
            agents,
            range: "1y".to_string(),
            news_limit: 5,
        }
    }

    /// Set the price history lookback
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Set the per-symbol news limit
    pub fn with_news_limit(mut self, limit: usize) -> Self {
        self.news_limit = limit;
        self
    }

    /// Market data source
    pub fn market(&self) -> &Arc<dyn MarketData> {
        &self.market
    }

    /// Performance of each symbol with data
    pub async fn compare_performance(&self, symbols: &[String]) -> Result<Performance> {
        Ok(compare_performance(self.market.as_ref(), symbols, &self.range).await?)
    }

    /// Ask the analyst to narrate relative performance
    #[instrument(skip_all, fields(symbols = performance.len()))]
    pub async fn market_analysis(&self, performance: &Performance) -> Result<String> {
        let prompt = prompts::market_analysis(&performance.to_string())?;
        ask(self.agents.analyst.as_ref(), prompt).await
    }

    /// Fetch profile and news for one symbol and ask for an analysis
    ///
    /// A symbol the provider does not know is analysed with every profile
    /// field "N/A"; missing news leaves the news list empty.
    #[instrument(skip(self))]
    pub async fn company_analysis(&self, symbol: &str) -> Result<CompanyAnalysis> {
        let profile = match self.market.profile(symbol).await {
            Ok(profile) => profile,
            Err(e) if e.is_missing_data() => {
                warn!(symbol, error = %e, "Profile unavailable, using N/A fields");
                CompanyProfile::unknown(symbol)
            }
            Err(e) => return Err(e.into()),
        };

        let news = match self.market.news(symbol, self.news_limit).await {
            Ok(mut news) => {
                news.truncate(self.news_limit);
                news
            }
            Err(e) if e.is_missing_data() => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let prompt = prompts::company_analysis(&profile, &news)?;
        let analysis = ask(self.agents.researcher.as_ref(), prompt).await?;

        Ok(CompanyAnalysis {
            symbol: symbol.to_string(),
            profile,
            analysis,
        })
    }

    /// Ask the strategist for recommendations
    #[instrument(skip_all)]
    pub async fn recommendations(
        &self,
        market_analysis: &str,
        companies: &[CompanyAnalysis],
        symbols: &[String],
    ) -> Result<String> {
        let prompt = prompts::recommendations(market_analysis, &pairs(companies), symbols)?;
        ask(self.agents.strategist.as_ref(), prompt).await
    }

    /// Run every stage and return the final report
    ///
    /// Stages run in order, one agent call each; earlier results are passed
    /// forward rather than recomputed.
    #[instrument(skip(self))]
    pub async fn final_report(&self, symbols: &[String]) -> Result<ReportOutcome> {
        let performance = self.compare_performance(symbols).await?;
        if performance.is_empty() {
            info!("No symbol has price data, skipping agents");
            return Ok(ReportOutcome::NoData {
                message: NO_DATA_MESSAGE.to_string(),
            });
        }

        let market_analysis = self.market_analysis(&performance).await?;

        let mut companies = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            companies.push(self.company_analysis(symbol).await?);
        }

        let recommendations = self
            .recommendations(&market_analysis, &companies, symbols)
            .await?;

        let prompt =
            prompts::final_report(&market_analysis, &pairs(&companies), &recommendations)?;
        let report = ask(self.agents.lead.as_ref(), prompt).await?;

        info!(report_length = report.len(), "Investment report complete");
        Ok(ReportOutcome::Report(InvestmentReport {
            symbols: symbols.to_vec(),
            performance,
            market_analysis,
            companies,
            recommendations,
            report,
        }))
    }
}

fn pairs(companies: &[CompanyAnalysis]) -> Vec<(String, String)> {
    companies
        .iter()
        .map(|c| (c.symbol.clone(), c.analysis.clone()))
        .collect()
}

async fn ask(agent: &dyn Agent, prompt: String) -> Result<String> {
    info!(agent = agent.name(), prompt_length = prompt.len(), "Running stage agent");
    let mut context = Context::new();
    Ok(agent.process(prompt, &mut context).await?)
}
