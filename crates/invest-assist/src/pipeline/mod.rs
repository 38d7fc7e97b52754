//! Investment report pipeline
//!
//! user symbols → performance comparison → market analysis → per-symbol
//! company analysis → recommendations → final report. Each stage issues
//! one agent call and hands its text to the next stage unchanged.

mod comparator;
mod personas;
pub mod prompts;
mod stages;

pub use comparator::{Performance, SymbolPerformance, compare_performance};
pub use personas::{
    PipelineAgents, analyst_profile, researcher_profile, strategist_profile, team_lead_profile,
};
pub use stages::{
    CompanyAnalysis, InvestmentReport, NO_DATA_MESSAGE, ReportOutcome, ReportPipeline,
};
