//! Configuration section schemas
//!
//! This module defines the three configuration sections, their default
//! values and the validation rule each one must satisfy.

use crate::config::env::{self, EnvSource};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// One of the three configuration sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Trading,
    Backend,
    Api,
}

impl Section {
    /// Sections in validation order
    pub const ALL: [Section; 3] = [Section::Trading, Section::Backend, Section::Api];

    /// Top-level key used in the persisted file
    pub fn key(&self) -> &'static str {
        match self {
            Section::Trading => "trading",
            Section::Backend => "backend",
            Section::Api => "api",
        }
    }

    /// Keys accepted on read in addition to the canonical one
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Section::Backend => &["firebase"],
            _ => &[],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.key() == s || section.aliases().iter().any(|alias| *alias == s))
            .ok_or_else(|| format!("Unknown section: {s}. Available: trading, backend, api"))
    }
}

/// Trading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingConfig {
    pub exchange_id: String,
    pub trading_pair: String,
    pub timeframe: String,

    pub initial_capital: f64,
    /// Fraction of capital per position, in (0, 1]
    pub max_position_size: f64,
    pub max_daily_loss: f64,

    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub max_open_positions: u32,

    /// Bars of history fed to the model
    pub lookback_period: u32,
    /// Bars ahead the model predicts
    pub prediction_horizon: u32,
    /// Seconds between model refreshes
    pub model_update_frequency: u64,

    /// Seconds before an unfilled order is abandoned
    pub order_timeout: u64,
    pub max_slippage: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            exchange_id: "binance".to_string(),
            trading_pair: "BTC/USDT".to_string(),
            timeframe: "1m".to_string(),
            initial_capital: 10000.0,
            max_position_size: 0.1,
            max_daily_loss: 0.02,
            stop_loss_pct: 0.01,
            take_profit_pct: 0.02,
            max_open_positions: 3,
            lookback_period: 100,
            prediction_horizon: 5,
            model_update_frequency: 3600,
            order_timeout: 30,
            max_slippage: 0.001,
        }
    }
}

impl TradingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::validation(
                Section::Trading,
                "initial_capital",
                "must be positive",
            ));
        }

        if !(self.max_position_size > 0.0 && self.max_position_size <= 1.0) {
            return Err(ConfigError::validation(
                Section::Trading,
                "max_position_size",
                "must be between 0 and 1",
            ));
        }

        if !(self.stop_loss_pct.is_finite() && self.stop_loss_pct > 0.0) {
            return Err(ConfigError::validation(
                Section::Trading,
                "stop_loss_pct",
                "must be positive",
            ));
        }

        Ok(())
    }

    /// First fractional or monetary field holding NaN or an infinity
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("initial_capital", self.initial_capital),
            ("max_position_size", self.max_position_size),
            ("max_daily_loss", self.max_daily_loss),
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
            ("max_slippage", self.max_slippage),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(field, _)| field)
    }

    pub fn model_update_interval(&self) -> Duration {
        Duration::from_secs(self.model_update_frequency)
    }

    pub fn order_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.order_timeout)
    }
}

/// Remote backend connection profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub project_id: String,
    pub credentials_path: String,
    pub database_url: String,
}

impl BackendConfig {
    /// Build the section from environment variables, empty when unset
    pub fn from_env(env: &dyn EnvSource) -> Self {
        Self {
            project_id: env.var_or_empty(env::FIREBASE_PROJECT_ID),
            credentials_path: env.var_or_empty(env::FIREBASE_CREDENTIALS_PATH),
            database_url: env.var_or_empty(env::FIREBASE_DATABASE_URL),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("project_id", &self.project_id),
            ("credentials_path", &self.credentials_path),
            ("database_url", &self.database_url),
        ];

        for (field, value) in required {
            if value.is_empty() {
                return Err(ConfigError::validation(Section::Backend, field, "is required"));
            }
        }

        Ok(())
    }
}

/// Exchange and notification credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub exchange_api_key: String,
    pub exchange_api_secret: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
}

impl ApiConfig {
    /// Build the section from environment variables, empty when unset
    pub fn from_env(env: &dyn EnvSource) -> Self {
        Self {
            exchange_api_key: env.var_or_empty(env::EXCHANGE_API_KEY),
            exchange_api_secret: env.var_or_empty(env::EXCHANGE_API_SECRET),
            telegram_bot_token: env.var_or_empty(env::TELEGRAM_BOT_TOKEN),
            telegram_chat_id: env.var_or_empty(env::TELEGRAM_CHAT_ID),
        }
    }

    /// Names of the exchange credential fields that are empty
    pub fn missing_exchange_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.exchange_api_key.is_empty() {
            missing.push("exchange_api_key");
        }
        if self.exchange_api_secret.is_empty() {
            missing.push("exchange_api_secret");
        }
        missing
    }

    /// Whether live trading against the exchange is possible
    pub fn has_exchange_credentials(&self) -> bool {
        self.missing_exchange_credentials().is_empty()
    }

    /// Never fails. Missing exchange credentials only degrade the
    /// application to no-trade mode, so they are reported as a warning.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_exchange_credentials();
        if !missing.is_empty() {
            warn!(
                "Exchange API credentials not configured (missing: {})",
                missing.join(", ")
            );
        }
        Ok(())
    }
}

/// The three sections as one value, in the shape of the persisted file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sections {
    pub trading: TradingConfig,
    pub backend: BackendConfig,
    pub api: ApiConfig,
}

impl Sections {
    /// Hard-coded defaults with environment-sourced fields filled from `env`
    pub fn defaults(env: &dyn EnvSource) -> Self {
        Self {
            trading: TradingConfig::default(),
            backend: BackendConfig::from_env(env),
            api: ApiConfig::from_env(env),
        }
    }
}
