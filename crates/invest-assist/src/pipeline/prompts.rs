//! Prompt templates for the report stages
//!
//! Templates are minijinja sources rendered with plain-text semantics (no
//! HTML escaping).

use crate::error::Result;
use crate::market::{CompanyProfile, NewsItem};
use minijinja::{Environment, context};
use std::sync::OnceLock;

/// Market analysis stage
pub const MARKET_ANALYSIS: &str = "Compare these stock performances:\n{{ performance }}";

/// Company analysis stage
pub const COMPANY_ANALYSIS: &str = "\
Provide an analysis of the company {{ name }} in the {{ sector }} sector.
Market cap: {{ market_cap }}
Summary: {{ summary }}
Latest news:{% for item in news %}
- {{ item }}{% else %} N/A{% endfor %}";

/// Recommendation stage
pub const RECOMMENDATIONS: &str = "\
Based on the market analysis: {{ market_analysis }}
And company news:{% for company in companies %}

### {{ company.symbol }}
{{ company.analysis }}{% endfor %}

Provide stock recommendations for these symbols: {{ symbols | join(', ') }}";

/// Final report stage
pub const FINAL_REPORT: &str = "\
Market Analysis: {{ market_analysis }}
Company Analysis:{% for company in companies %}

### {{ company.symbol }}
{{ company.analysis }}{% endfor %}

Stock Recommendations: {{ recommendations }}
Provide the full analysis of each stock with Fundamentals and market news
Generate a final ranked list in ascending order on which should I buy.";

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        // Sources are constants; a syntax error surfaces at render time
        for (name, source) in [
            ("market_analysis.txt", MARKET_ANALYSIS),
            ("company_analysis.txt", COMPANY_ANALYSIS),
            ("recommendations.txt", RECOMMENDATIONS),
            ("final_report.txt", FINAL_REPORT),
        ] {
            if let Err(e) = env.add_template(name, source) {
                tracing::error!(template = name, error = %e, "Invalid prompt template");
            }
        }
        env
    })
}

fn render(name: &str, ctx: minijinja::Value) -> Result<String> {
    Ok(environment().get_template(name)?.render(ctx)?)
}

/// (symbol, analysis) pair as seen by the templates
#[derive(serde::Serialize)]
struct CompanyEntry<'a> {
    symbol: &'a str,
    analysis: &'a str,
}

fn company_entries(companies: &[(String, String)]) -> Vec<CompanyEntry<'_>> {
    companies
        .iter()
        .map(|(symbol, analysis)| CompanyEntry { symbol, analysis })
        .collect()
}

/// Prompt asking for a relative performance narrative
pub fn market_analysis(performance: &str) -> Result<String> {
    render("market_analysis.txt", context! { performance })
}

/// Prompt asking for a company narrative; absent fields read "N/A"
pub fn company_analysis(profile: &CompanyProfile, news: &[NewsItem]) -> Result<String> {
    let news: Vec<String> = news.iter().map(ToString::to_string).collect();
    render(
        "company_analysis.txt",
        context! {
            name => profile.name_or_na(),
            sector => profile.sector_or_na(),
            market_cap => profile.market_cap_or_na(),
            summary => profile.summary_or_na(),
            news,
        },
    )
}

/// Prompt asking for ranked recommendations
pub fn recommendations(
    market_analysis: &str,
    companies: &[(String, String)],
    symbols: &[String],
) -> Result<String> {
    render(
        "recommendations.txt",
        context! {
            market_analysis,
            companies => company_entries(companies),
            symbols,
        },
    )
}

/// Prompt producing the user-facing report
pub fn final_report(
    market_analysis: &str,
    companies: &[(String, String)],
    recommendations: &str,
) -> Result<String> {
    render(
        "final_report.txt",
        context! {
            market_analysis,
            companies => company_entries(companies),
            recommendations,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_prompt_uses_placeholders() {
        let prompt = company_analysis(&CompanyProfile::unknown("XYZ"), &[]).unwrap();
        assert_eq!(
            prompt,
            "Provide an analysis of the company N/A in the N/A sector.\n\
             Market cap: N/A\n\
             Summary: N/A\n\
             Latest news: N/A"
        );
    }

    #[test]
    fn test_company_prompt_lists_news() {
        let profile = CompanyProfile {
            symbol: "TCS.NS".to_string(),
            long_name: Some("Tata Consultancy Services".to_string()),
            sector: Some("Technology".to_string()),
            market_cap: Some(14_000_000_000_000),
            summary: Some("IT services & consulting.".to_string()),
        };
        let news = vec![NewsItem {
            title: "TCS <wins> deal".to_string(),
            publisher: None,
            link: None,
            published_at: None,
        }];

        let prompt = company_analysis(&profile, &news).unwrap();
        assert!(prompt.contains("company Tata Consultancy Services in the Technology sector"));
        assert!(prompt.contains("Market cap: 14000000000000"));
        // No HTML escaping in prompts
        assert!(prompt.contains("IT services & consulting."));
        assert!(prompt.ends_with("Latest news:\n- TCS <wins> deal"));
    }

    #[test]
    fn test_recommendation_and_final_prompts() {
        let companies = vec![
            ("AAPL".to_string(), "Apple analysis".to_string()),
            ("TSLA".to_string(), "Tesla analysis".to_string()),
        ];
        let symbols = vec!["AAPL".to_string(), "TSLA".to_string()];

        let recs = recommendations("market text", &companies, &symbols).unwrap();
        assert!(recs.starts_with("Based on the market analysis: market text"));
        assert!(recs.contains("### TSLA\nTesla analysis"));
        assert!(recs.ends_with("for these symbols: AAPL, TSLA"));

        let report = final_report("market text", &companies, "buy AAPL").unwrap();
        assert!(report.contains("Stock Recommendations: buy AAPL"));
        assert!(report.ends_with("in ascending order on which should I buy."));
    }

    #[test]
    fn test_market_prompt() {
        let prompt = market_analysis("AAPL: 0.1000 (+10.00%)").unwrap();
        assert_eq!(prompt, "Compare these stock performances:\nAAPL: 0.1000 (+10.00%)");
    }
}
