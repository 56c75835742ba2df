//! Environment lookup
//!
//! Section defaults for the backend and API sections are computed from
//! environment variables. The lookup is passed in explicitly so callers
//! (and tests) can supply their own variables instead of the process
//! environment.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const FIREBASE_PROJECT_ID: &str = "FIREBASE_PROJECT_ID";
pub const FIREBASE_CREDENTIALS_PATH: &str = "FIREBASE_CREDENTIALS_PATH";
pub const FIREBASE_DATABASE_URL: &str = "FIREBASE_DATABASE_URL";
pub const EXCHANGE_API_KEY: &str = "EXCHANGE_API_KEY";
pub const EXCHANGE_API_SECRET: &str = "EXCHANGE_API_SECRET";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Gate checked before any `.env` file is read
pub const DOTENV_DISABLED: &str = "DOTENV_DISABLED";

/// Environment variable feeding a section field, if any
pub fn variable_for(field: &str) -> Option<&'static str> {
    match field {
        "project_id" => Some(FIREBASE_PROJECT_ID),
        "credentials_path" => Some(FIREBASE_CREDENTIALS_PATH),
        "database_url" => Some(FIREBASE_DATABASE_URL),
        "exchange_api_key" => Some(EXCHANGE_API_KEY),
        "exchange_api_secret" => Some(EXCHANGE_API_SECRET),
        "telegram_bot_token" => Some(TELEGRAM_BOT_TOKEN),
        "telegram_chat_id" => Some(TELEGRAM_CHAT_ID),
        _ => None,
    }
}

/// Source of environment variables
pub trait EnvSource {
    /// Value of `key`, or `None` when unset
    fn var(&self, key: &str) -> Option<String>;

    /// Value of `key`, or the empty string when unset
    fn var_or_empty(&self, key: &str) -> String {
        self.var(key).unwrap_or_default()
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

/// What happened when looking for a `.env` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotenvOutcome {
    /// `DOTENV_DISABLED` was set
    Disabled,
    /// No `.env` file in the working directory or its parents
    NotFound,
    /// Variables loaded from this file
    Loaded(PathBuf),
    /// A `.env` file exists but could not be read or parsed
    Failed(String),
}

/// Load a `.env` file into the process environment.
///
/// Skipped entirely when `DOTENV_DISABLED` is set. Nothing is logged here;
/// this runs before logging is set up, so the caller reports the outcome.
pub fn load_dotenv() -> DotenvOutcome {
    if std::env::var_os(DOTENV_DISABLED).is_some() {
        return DotenvOutcome::Disabled;
    }

    dotenv_outcome(dotenvy::dotenv())
}

fn dotenv_outcome(result: std::result::Result<PathBuf, dotenvy::Error>) -> DotenvOutcome {
    match result {
        Ok(path) => DotenvOutcome::Loaded(path),
        Err(e) if e.not_found() => DotenvOutcome::NotFound,
        Err(e) => DotenvOutcome::Failed(e.to_string()),
    }
}

/// Log a `.env` outcome once a subscriber is installed
pub fn report_dotenv(outcome: &DotenvOutcome) {
    match outcome {
        DotenvOutcome::Disabled => debug!("{} set, skipped .env", DOTENV_DISABLED),
        DotenvOutcome::NotFound => debug!("No .env file found"),
        DotenvOutcome::Loaded(path) => info!("Loaded environment from {}", path.display()),
        DotenvOutcome::Failed(e) => warn!("Failed to load .env file: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_env_lookup() {
        let env: HashMap<&str, &str> = [(EXCHANGE_API_KEY, "key")].into_iter().collect();

        assert_eq!(env.var(EXCHANGE_API_KEY), Some("key".to_string()));
        assert_eq!(env.var(EXCHANGE_API_SECRET), None);
        assert_eq!(env.var_or_empty(EXCHANGE_API_SECRET), "");
    }

    #[test]
    fn test_dotenv_outcomes() {
        let parse_error = dotenvy::Error::LineParse("KEY VALUE".to_string(), 4);
        assert!(matches!(
            dotenv_outcome(Err(parse_error)),
            DotenvOutcome::Failed(msg) if msg.contains("KEY VALUE")
        ));

        let missing = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(dotenv_outcome(Err(missing)), DotenvOutcome::NotFound);

        let loaded = dotenv_outcome(Ok(PathBuf::from(".env")));
        assert_eq!(loaded, DotenvOutcome::Loaded(PathBuf::from(".env")));
    }

    #[test]
    fn test_variable_for_fields() {
        assert_eq!(variable_for("database_url"), Some(FIREBASE_DATABASE_URL));
        assert_eq!(variable_for("telegram_bot_token"), Some(TELEGRAM_BOT_TOKEN));
        assert_eq!(variable_for("initial_capital"), None);
    }

    #[test]
    fn test_owned_map_env_lookup() {
        let mut env = HashMap::new();
        env.insert(TELEGRAM_CHAT_ID.to_string(), "42".to_string());

        assert_eq!(env.var_or_empty(TELEGRAM_CHAT_ID), "42");
    }
}
