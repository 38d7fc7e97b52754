//! Wiring of provider, market data, report pipeline and chat team

use crate::chat::{ChatAssistant, SessionStore};
use crate::config::AssistConfig;
use crate::error::Result;
use crate::market::{MarketData, YahooMarketData};
use crate::pipeline::{PipelineAgents, ReportPipeline};
use crate::web::AppState;
use agent_llm::LLMProvider;
use agent_llm::providers::OpenAIProvider;
use agent_runtime::AgentRuntime;
use std::sync::Arc;
use tracing::info;

/// Everything the CLI and the web server need
pub struct Services {
    pub config: AssistConfig,
    pub runtime: AgentRuntime,
    pub market: Arc<dyn MarketData>,
    pub pipeline: ReportPipeline,
    pub chat: ChatAssistant,
}

impl Services {
    /// Build against the configured backend and Yahoo Finance
    pub fn from_config(config: AssistConfig) -> Result<Self> {
        config.validate()?;
        let provider = Arc::new(OpenAIProvider::with_config(config.provider_config())?);
        let market = Arc::new(YahooMarketData::new()?);
        info!(backend = config.backend.name(), model = %config.model, "Using model backend");
        Self::with_parts(config, provider, market)
    }

    /// Build from an explicit provider and data source
    pub fn with_parts(
        config: AssistConfig,
        provider: Arc<dyn LLMProvider>,
        market: Arc<dyn MarketData>,
    ) -> Result<Self> {
        let runtime = AgentRuntime::builder()
            .provider(provider)
            .default_model(config.model.clone())
            .default_max_iterations(config.max_iterations)
            .max_tokens(config.max_tokens)
            .temperature(config.temperature)
            .build()?;

        let pipeline = ReportPipeline::new(market.clone(), PipelineAgents::from_runtime(&runtime))
            .with_range(config.history_range.clone())
            .with_news_limit(config.news_limit);
        let chat = ChatAssistant::build(
            &runtime,
            market.clone(),
            config.tavily_api_key.clone(),
            config.news_limit,
        )?;

        Ok(Self {
            config,
            runtime,
            market,
            pipeline,
            chat,
        })
    }

    /// Web server state over these services
    pub fn app_state(&self) -> Result<AppState> {
        AppState::new(
            SessionStore::with_idle_timeout(self.config.session_idle_timeout),
            self.chat.clone(),
            self.pipeline.clone(),
        )
    }
}
