mod common;

use common::{EchoProvider, FakeMarket, sample_market, services};
use invest_assist::pipeline::NO_DATA_MESSAGE;
use invest_assist::{ReportOutcome, parse_symbols};
use std::sync::Arc;

#[tokio::test]
async fn test_report_runs_each_stage_once() {
    let provider = Arc::new(EchoProvider::new("done"));
    let services = services(provider.clone(), sample_market());
    let symbols = parse_symbols("aapl, TCS.NS, ZZZZ").unwrap();

    let outcome = services.pipeline.final_report(&symbols).await.unwrap();
    let ReportOutcome::Report(report) = outcome else {
        panic!("expected a report");
    };

    // ZZZZ has no history and is left out of the comparison
    assert_eq!(report.performance.len(), 2);
    assert!(report.performance.get("ZZZZ").is_none());
    let aapl = report.performance.get("AAPL").unwrap();
    assert!((aapl - 0.04).abs() < 1e-9);

    assert_eq!(report.companies.len(), 3);
    assert_eq!(report.companies[2].profile.name_or_na(), "N/A");
    assert_eq!(report.market_analysis, "Market Analyst: done");
    assert_eq!(report.recommendations, "Stock Strategist: done");
    assert_eq!(report.report, "Team Lead: done");

    assert_eq!(
        provider.agents(),
        vec![
            "Market Analyst",
            "Company Researcher",
            "Company Researcher",
            "Company Researcher",
            "Stock Strategist",
            "Team Lead",
        ]
    );
}

#[tokio::test]
async fn test_final_prompt_reuses_earlier_results() {
    let provider = Arc::new(EchoProvider::new("insight"));
    let services = services(provider.clone(), sample_market());
    let symbols = parse_symbols("AAPL").unwrap();

    services.pipeline.final_report(&symbols).await.unwrap();

    let final_prompt = provider.last_user_text();
    assert!(final_prompt.contains("Market Analysis: Market Analyst: insight"));
    assert!(final_prompt.contains("Company Researcher: insight"));
    assert!(final_prompt.contains("Stock Recommendations: Stock Strategist: insight"));
}

#[tokio::test]
async fn test_no_data_calls_no_agent() {
    let provider = Arc::new(EchoProvider::new("unused"));
    let services = services(provider.clone(), FakeMarket::new());
    let symbols = parse_symbols("FOO, BAR").unwrap();

    let outcome = services.pipeline.final_report(&symbols).await.unwrap();

    assert!(matches!(
        outcome,
        ReportOutcome::NoData { ref message } if message == NO_DATA_MESSAGE
    ));
    assert_eq!(provider.request_count(), 0);
}
