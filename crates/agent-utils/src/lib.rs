//! Shared utilities for invest-assist
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and environment helpers.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, env_or, load_dotenv, optional_env};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
