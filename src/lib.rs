//! tradecfg - layered configuration for an automated trading application
//!
//! Resolves trading parameters, the backend connection profile and API
//! credentials from defaults, environment variables and a JSON file, and
//! validates the result before the application starts.

pub mod cli;
pub mod config;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, BackendConfig, ConfigManager, Section, TradingConfig};
pub use error::{ConfigError, Result};
