//! Web search tools

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

const DUCKDUCKGO_API: &str = "https://api.duckduckgo.com/";
const TAVILY_API: &str = "https://api.tavily.com/search";
const DEFAULT_MAX_RESULTS: usize = 5;
const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

impl SearchParams {
    fn parse(tool: &str, params: Value) -> AgentResult<Self> {
        let params: Self = serde_json::from_value(params).map_err(|e| failed(tool, format!("Invalid parameters: {e}")))?;
        if params.query.trim().is_empty() {
            return Err(failed(tool, "query must not be empty"));
        }
        Ok(params)
    }

    fn limit(&self) -> usize {
        self.max_results.unwrap_or(DEFAULT_MAX_RESULTS).clamp(1, 10)
    }
}

fn failed(tool: &str, reason: impl Into<String>) -> agent_core::Error {
    agent_core::Error::ToolFailed {
        tool: tool.to_string(),
        reason: reason.into(),
    }
}

fn http_client(tool: &str) -> AgentResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(SEARCH_TIMEOUT)
        .user_agent(concat!("invest-assist/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| agent_core::Error::InitializationFailed(format!("{tool}: {e}")))
}

fn search_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "What to search the web for"
            },
            "max_results": {
                "type": "integer",
                "description": "Maximum number of results (default 5)",
                "minimum": 1,
                "maximum": 10
            }
        },
        "required": ["query"]
    })
}

fn html_tags() -> Option<&'static Regex> {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]*>").ok()).as_ref()
}

fn strip_html(text: &str) -> String {
    match html_tags() {
        Some(tags) => tags.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// DuckDuckGo Instant Answer search, no key needed
pub struct DuckDuckGoSearchTool {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearchTool {
    pub fn new() -> AgentResult<Self> {
        Ok(Self {
            client: http_client("duckduckgo_search")?,
            endpoint: DUCKDUCKGO_API.to_string(),
        })
    }
}

/// Flatten the abstract and related topics into result rows
fn parse_duckduckgo(body: &Value, limit: usize) -> Vec<Value> {
    let mut results = Vec::new();

    let abstract_text = body["AbstractText"].as_str().unwrap_or_default();
    if !abstract_text.is_empty() {
        results.push(json!({
            "title": body["Heading"].as_str().unwrap_or_default(),
            "url": body["AbstractURL"].as_str().unwrap_or_default(),
            "snippet": abstract_text,
            "source": body["AbstractSource"].as_str().unwrap_or_default(),
        }));
    }

    let mut stack: Vec<&Value> = body["RelatedTopics"]
        .as_array()
        .map(|topics| topics.iter().rev().collect())
        .unwrap_or_default();

    while let Some(topic) = stack.pop() {
        if results.len() >= limit {
            break;
        }
        // Category groups nest their entries under "Topics"
        if let Some(nested) = topic["Topics"].as_array() {
            stack.extend(nested.iter().rev());
            continue;
        }
        let Some(text) = topic["Text"].as_str() else {
            continue;
        };
        let title = topic["Result"]
            .as_str()
            .map(strip_html)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| text.to_string());
        results.push(json!({
            "title": title,
            "url": topic["FirstURL"].as_str().unwrap_or_default(),
            "snippet": text,
        }));
    }

    results.truncate(limit);
    results
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params = SearchParams::parse(self.name(), params)?;
        debug!(query = %params.query, "duckduckgo search");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", params.query.as_str()),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| failed(self.name(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(self.name(), format!("HTTP {}", response.status())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| failed(self.name(), e.to_string()))?;
        let results = parse_duckduckgo(&body, params.limit());

        Ok(json!({ "query": params.query, "results": results }))
    }

    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the web with DuckDuckGo. Returns titles, links and snippets; cite the links as sources."
    }

    fn input_schema(&self) -> Value {
        search_schema()
    }
}

/// Tavily search API
pub struct TavilySearchTool {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl TavilySearchTool {
    pub fn new(api_key: impl Into<String>) -> AgentResult<Self> {
        Ok(Self {
            client: http_client("tavily_search")?,
            api_key: api_key.into(),
            endpoint: TAVILY_API.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl Tool for TavilySearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params = SearchParams::parse(self.name(), params)?;
        debug!(query = %params.query, "tavily search");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "query": params.query,
                "max_results": params.limit(),
                "include_answer": true,
            }))
            .send()
            .await
            .map_err(|e| failed(self.name(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failed(self.name(), format!("HTTP {status}: {body}")));
        }

        let body: TavilyResponse = response
            .json()
            .await
            .map_err(|e| failed(self.name(), e.to_string()))?;
        let results: Vec<Value> = body
            .results
            .into_iter()
            .map(|r| json!({ "title": r.title, "url": r.url, "snippet": r.content }))
            .collect();

        Ok(json!({
            "query": params.query,
            "answer": body.answer,
            "results": results,
        }))
    }

    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "Search the web with Tavily for recent news and articles. Returns a short answer plus sources."
    }

    fn input_schema(&self) -> Value {
        search_schema()
    }
}
