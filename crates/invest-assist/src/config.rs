//! Configuration for the investment assistant

use crate::error::{AssistError, Result};
use agent_llm::providers::{Backend, OpenAIConfig};
use crate::chat::DEFAULT_IDLE_TIMEOUT;
use agent_utils::{env_or, optional_env};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bind address of the web UI
pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";

/// Configuration for model access, market data and the web server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistConfig {
    /// Model backend
    pub backend: Backend,

    /// Model identifier
    pub model: String,

    /// Override for the backend's API base URL
    pub api_base: Option<String>,

    /// API key for the model backend
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Tavily search key; the Tavily tool is only registered when set
    #[serde(skip_serializing)]
    pub tavily_api_key: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Model request timeout
    pub request_timeout: Duration,

    /// Maximum tool rounds per agent call
    pub max_iterations: usize,

    /// Price history lookback passed to the data provider
    pub history_range: String,

    /// Maximum news items per symbol
    pub news_limit: usize,

    /// Web server bind address
    pub bind_addr: String,

    /// Chat sessions idle this long are dropped
    pub session_idle_timeout: Duration,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Groq,
            model: Backend::Groq.default_model().to_string(),
            api_base: None,
            api_key: None,
            tavily_api_key: None,
            max_tokens: 4096,
            temperature: 0.7,
            request_timeout: Duration::from_secs(120),
            max_iterations: 10,
            history_range: "1y".to_string(),
            news_limit: 5,
            bind_addr: DEFAULT_ADDR.to_string(),
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl AssistConfig {
    /// Create a new configuration builder
    pub fn builder() -> AssistConfigBuilder {
        AssistConfigBuilder::default()
    }

    /// Read configuration from the environment
    ///
    /// `LLM_BACKEND` selects the backend (default `groq`); the model defaults
    /// to the backend's preset unless `LLM_MODEL` is set.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(AssistError::Config("model must not be empty".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(AssistError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if self.session_idle_timeout.is_zero() {
            return Err(AssistError::Config(
                "session_idle_timeout must be greater than 0".to_string(),
            ));
        }
        if self.news_limit == 0 {
            return Err(AssistError::Config(
                "news_limit must be greater than 0".to_string(),
            ));
        }
        if self.backend != Backend::Custom && self.api_key.is_none() {
            return Err(AssistError::Config(format!(
                "{} is required for the {} backend",
                self.backend.api_key_vars().join(" or "),
                self.backend.name()
            )));
        }
        Ok(())
    }

    /// Provider configuration for the selected backend
    pub fn provider_config(&self) -> OpenAIConfig {
        let key = self.api_key.clone().unwrap_or_else(|| "not-needed".to_string());
        let mut config = OpenAIConfig::new(self.backend, key)
            .with_timeout(self.request_timeout.as_secs());
        if let Some(base) = &self.api_base {
            config = config.with_api_base(base.clone());
        }
        config
    }
}

/// Builder for AssistConfig
#[derive(Debug, Default)]
pub struct AssistConfigBuilder {
    backend: Option<Backend>,
    model: Option<String>,
    api_base: Option<String>,
    api_key: Option<String>,
    tavily_api_key: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    request_timeout: Option<Duration>,
    max_iterations: Option<usize>,
    history_range: Option<String>,
    news_limit: Option<usize>,
    bind_addr: Option<String>,
    session_idle_timeout: Option<Duration>,
}

impl AssistConfigBuilder {
    /// Set the model backend
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the model API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the Tavily API key
    pub fn tavily_api_key(mut self, key: impl Into<String>) -> Self {
        self.tavily_api_key = Some(key.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the model request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set maximum tool rounds per agent call
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Set the price history lookback (e.g. `1y`)
    pub fn history_range(mut self, range: impl Into<String>) -> Self {
        self.history_range = Some(range.into());
        self
    }

    /// Set the per-symbol news limit
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the web server bind address
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    /// Set how long an idle chat session is kept
    pub fn session_idle_timeout(mut self, duration: Duration) -> Self {
        self.session_idle_timeout = Some(duration);
        self
    }

    /// Fill unset fields from environment variables
    pub fn with_env(mut self) -> Result<Self> {
        if self.backend.is_none() {
            let name = env_or("LLM_BACKEND", "groq");
            let backend = Backend::from_name(&name)
                .ok_or_else(|| AssistError::Config(format!("unknown LLM_BACKEND: {name}")))?;
            self.backend = Some(backend);
        }
        let backend = self.backend.unwrap_or(Backend::Groq);

        if self.model.is_none() {
            self.model = optional_env("LLM_MODEL");
        }
        if self.api_base.is_none() {
            self.api_base = optional_env("LLM_API_BASE");
        }
        if self.api_key.is_none() {
            self.api_key = backend
                .api_key_vars()
                .iter()
                .find_map(|var| optional_env(var));
        }
        if self.tavily_api_key.is_none() {
            self.tavily_api_key = optional_env("TAVILY_API_KEY");
        }
        if self.bind_addr.is_none() {
            self.bind_addr = optional_env("INVEST_ASSIST_ADDR");
        }
        if self.session_idle_timeout.is_none() {
            if let Some(secs) = optional_env("SESSION_IDLE_SECS") {
                let secs: u64 = secs.parse().map_err(|_| {
                    AssistError::Config(format!(
                        "SESSION_IDLE_SECS must be a number of seconds: {secs}"
                    ))
                })?;
                self.session_idle_timeout = Some(Duration::from_secs(secs));
            }
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<AssistConfig> {
        let defaults = AssistConfig::default();
        let backend = self.backend.unwrap_or(defaults.backend);

        let config = AssistConfig {
            backend,
            model: self
                .model
                .unwrap_or_else(|| backend.default_model().to_string()),
            api_base: self.api_base,
            api_key: self.api_key,
            tavily_api_key: self.tavily_api_key,
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            history_range: self.history_range.unwrap_or(defaults.history_range),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
            session_idle_timeout: self
                .session_idle_timeout
                .unwrap_or(defaults.session_idle_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}
