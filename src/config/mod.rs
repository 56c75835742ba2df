//! Configuration management module
//!
//! This module handles configuration resolution, validation, and persistence
//! from multiple sources: hard-coded defaults, environment variables and a
//! JSON configuration file.

pub mod env;
pub mod loader;
pub mod manager;
pub mod settings;
pub mod validator;

pub use env::{load_dotenv, report_dotenv, DotenvOutcome, EnvSource, ProcessEnv};
pub use loader::{FileOverrides, LoadOutcome};
pub use manager::{ConfigManager, DEFAULT_CONFIG_PATH};
pub use settings::*;
pub use validator::validate_all;
