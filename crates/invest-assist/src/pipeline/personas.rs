//! The four report agents

use agent_core::Agent;
use agent_runtime::{AgentProfile, AgentRuntime};
use std::sync::Arc;

/// Compares price performance across symbols
pub fn analyst_profile() -> AgentProfile {
    AgentProfile::new("Market Analyst")
        .description("AI agent that thoroughly analyses stocks and compares their performance over time.")
        .instructions([
            "Compare the stock performance figures you are given.",
            "The figures are the summed daily percentage change over a 12-month period.",
            "Rank stocks based on their relative performance.",
        ])
        .markdown(true)
}

/// Summarises company profile and news
pub fn researcher_profile() -> AgentProfile {
    AgentProfile::new("Company Researcher")
        .description("AI agent that analyses company profiles, financials and latest news.")
        .instructions([
            "Provide a summary of the company, its sector, market cap and a brief business summary.",
            "Summarize the latest news articles related to the company that are relevant to investors.",
        ])
        .markdown(true)
}

/// Turns analyses into recommendations
pub fn strategist_profile() -> AgentProfile {
    AgentProfile::new("Stock Strategist")
        .description("AI agent that provides stock market analysis and insights.")
        .instructions([
            "Analyze stock performance, company fundamentals and latest news that can affect the price.",
            "Evaluate risk-reward potential, compare stocks and industry trends.",
            "Provide top stock recommendations for investors with good profit potential.",
        ])
        .markdown(true)
}

/// Writes the final investor report
pub fn team_lead_profile() -> AgentProfile {
    AgentProfile::new("Team Lead")
        .description("Aggregates stock analysis, company research and investment strategies.")
        .instructions([
            "Compile stock performance, company analysis, recommendations and investment strategies.",
            "Ensure all insights are structured in an investor-friendly report.",
            "Rank the top stocks based on combined analysis and provide actionable insights.",
        ])
        .markdown(true)
}

/// Agents used by the report stages
#[derive(Clone)]
pub struct PipelineAgents {
    /// Market analysis stage
    pub analyst: Arc<dyn Agent>,
    /// Company analysis stage
    pub researcher: Arc<dyn Agent>,
    /// Recommendation stage
    pub strategist: Arc<dyn Agent>,
    /// Final report stage
    pub lead: Arc<dyn Agent>,
}

impl PipelineAgents {
    /// Tool-less agents over the runtime's provider
    ///
    /// Every stage prompt already carries its data, so one model call per
    /// stage is enough.
    pub fn from_runtime(runtime: &AgentRuntime) -> Self {
        Self {
            analyst: Arc::new(runtime.create_simple_agent(analyst_profile())),
            researcher: Arc::new(runtime.create_simple_agent(researcher_profile())),
            strategist: Arc::new(runtime.create_simple_agent(strategist_profile())),
            lead: Arc::new(runtime.create_simple_agent(team_lead_profile())),
        }
    }
}
