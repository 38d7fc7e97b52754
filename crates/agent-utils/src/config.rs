//! Configuration management utilities

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("{0} environment variable not set")]
    MissingVar(String),

    /// A value could not be parsed
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable or field name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Application identity shared by every binary in the workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "invest-assist".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Read `APP_ENV` on top of the defaults
    pub fn from_env() -> Self {
        Self {
            environment: env_or("APP_ENV", "development"),
            ..Self::default()
        }
    }
}

/// Load a `.env` file from the working directory if one exists
///
/// Returns whether a file was loaded.
pub fn load_dotenv() -> bool {
    dotenvy::dotenv().is_ok()
}

/// Read an environment variable, treating empty values as unset
pub fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read an environment variable or fall back to a default
pub fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}
