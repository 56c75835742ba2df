//! Configuration file loading
//!
//! The persisted file is a JSON object with up to three section keys, each
//! holding a subset of that section's fields. Loading is best-effort: a
//! missing file is normal and a broken one is logged and skipped, so the
//! defaults and environment values always survive.

use crate::config::settings::{ApiConfig, BackendConfig, Section, Sections, TradingConfig};
use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

fn pick<T: Clone>(value: &Option<T>, current: &T) -> T {
    value.as_ref().unwrap_or(current).clone()
}

/// Per-field overrides for the trading section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingOverrides {
    pub exchange_id: Option<String>,
    pub trading_pair: Option<String>,
    pub timeframe: Option<String>,
    pub initial_capital: Option<f64>,
    pub max_position_size: Option<f64>,
    pub max_daily_loss: Option<f64>,
    pub stop_loss_pct: Option<f64>,
    pub take_profit_pct: Option<f64>,
    pub max_open_positions: Option<u32>,
    pub lookback_period: Option<u32>,
    pub prediction_horizon: Option<u32>,
    pub model_update_frequency: Option<u64>,
    pub order_timeout: Option<u64>,
    pub max_slippage: Option<f64>,
}

impl TradingOverrides {
    /// New section with the named fields replaced and the rest kept
    pub fn apply(&self, current: &TradingConfig) -> TradingConfig {
        TradingConfig {
            exchange_id: pick(&self.exchange_id, &current.exchange_id),
            trading_pair: pick(&self.trading_pair, &current.trading_pair),
            timeframe: pick(&self.timeframe, &current.timeframe),
            initial_capital: pick(&self.initial_capital, &current.initial_capital),
            max_position_size: pick(&self.max_position_size, &current.max_position_size),
            max_daily_loss: pick(&self.max_daily_loss, &current.max_daily_loss),
            stop_loss_pct: pick(&self.stop_loss_pct, &current.stop_loss_pct),
            take_profit_pct: pick(&self.take_profit_pct, &current.take_profit_pct),
            max_open_positions: pick(&self.max_open_positions, &current.max_open_positions),
            lookback_period: pick(&self.lookback_period, &current.lookback_period),
            prediction_horizon: pick(&self.prediction_horizon, &current.prediction_horizon),
            model_update_frequency: pick(
                &self.model_update_frequency,
                &current.model_update_frequency,
            ),
            order_timeout: pick(&self.order_timeout, &current.order_timeout),
            max_slippage: pick(&self.max_slippage, &current.max_slippage),
        }
    }
}

/// Per-field overrides for the backend section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendOverrides {
    pub project_id: Option<String>,
    pub credentials_path: Option<String>,
    pub database_url: Option<String>,
}

impl BackendOverrides {
    pub fn apply(&self, current: &BackendConfig) -> BackendConfig {
        BackendConfig {
            project_id: pick(&self.project_id, &current.project_id),
            credentials_path: pick(&self.credentials_path, &current.credentials_path),
            database_url: pick(&self.database_url, &current.database_url),
        }
    }
}

/// Per-field overrides for the API section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiOverrides {
    pub exchange_api_key: Option<String>,
    pub exchange_api_secret: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl ApiOverrides {
    pub fn apply(&self, current: &ApiConfig) -> ApiConfig {
        ApiConfig {
            exchange_api_key: pick(&self.exchange_api_key, &current.exchange_api_key),
            exchange_api_secret: pick(&self.exchange_api_secret, &current.exchange_api_secret),
            telegram_bot_token: pick(&self.telegram_bot_token, &current.telegram_bot_token),
            telegram_chat_id: pick(&self.telegram_chat_id, &current.telegram_chat_id),
        }
    }
}

/// Everything a config file asked to override
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileOverrides {
    pub trading: Option<TradingOverrides>,
    pub backend: Option<BackendOverrides>,
    pub api: Option<ApiOverrides>,
}

impl FileOverrides {
    /// Overlay onto `base`, section by section and field by field
    pub fn apply(&self, base: &Sections) -> Sections {
        Sections {
            trading: self
                .trading
                .as_ref()
                .map_or_else(|| base.trading.clone(), |o| o.apply(&base.trading)),
            backend: self
                .backend
                .as_ref()
                .map_or_else(|| base.backend.clone(), |o| o.apply(&base.backend)),
            api: self
                .api
                .as_ref()
                .map_or_else(|| base.api.clone(), |o| o.apply(&base.api)),
        }
    }

    /// Field names set by the file for `section`
    pub fn named_fields(&self, section: Section) -> Vec<String> {
        let value = match section {
            Section::Trading => self.trading.as_ref().map(serde_json::to_value),
            Section::Backend => self.backend.as_ref().map(serde_json::to_value),
            Section::Api => self.api.as_ref().map(serde_json::to_value),
        };

        match value {
            Some(Ok(Value::Object(fields))) => fields
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, _)| k)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Result of looking for a config file
#[derive(Debug)]
pub enum LoadOutcome {
    /// No file at the path
    Missing,
    /// File read and parsed
    Parsed(FileOverrides),
    /// File present but unusable
    Failed(ConfigError),
}

fn take_section<T: DeserializeOwned>(
    root: &mut Map<String, Value>,
    section: Section,
    path: &Path,
) -> Result<Option<T>> {
    // A null canonical key counts as absent, so an alias can still supply the section
    let value = match root.remove(section.key()).filter(|v| !v.is_null()) {
        Some(value) => Some(value),
        None => section
            .aliases()
            .iter()
            .find_map(|alias| root.remove(*alias).filter(|v| !v.is_null())),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ConfigError::malformed(path, format!("section '{section}': {e}"))),
        Some(_) => Err(ConfigError::malformed(
            path,
            format!("section '{section}' is not a JSON object"),
        )),
    }
}

/// Parse the contents of a config file. Unknown keys are ignored.
pub fn parse_overrides(contents: &str, path: &Path) -> Result<FileOverrides> {
    let document: Value = serde_json::from_str(contents)
        .map_err(|e| ConfigError::malformed(path, format!("invalid JSON: {e}")))?;

    let Value::Object(mut root) = document else {
        return Err(ConfigError::malformed(
            path,
            "top-level value is not a JSON object",
        ));
    };

    Ok(FileOverrides {
        trading: take_section(&mut root, Section::Trading, path)?,
        backend: take_section(&mut root, Section::Backend, path)?,
        api: take_section(&mut root, Section::Api, path)?,
    })
}

/// Read and parse the file at `path`. Never fails; problems are reported
/// through the outcome.
pub fn read_overrides(path: &Path) -> LoadOutcome {
    if !path.exists() {
        return LoadOutcome::Missing;
    }

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::malformed(path, e.to_string()))
        .and_then(|contents| parse_overrides(&contents, path));

    match parsed {
        Ok(overrides) => LoadOutcome::Parsed(overrides),
        Err(e) => LoadOutcome::Failed(e),
    }
}

/// Overlay the file at `path` onto `base`, returning the overrides applied.
///
/// The overlay is all or nothing: if any part of the file is unusable the
/// whole file is skipped with a warning, `base` is returned unchanged and
/// no overrides are reported.
pub fn overlay_file(path: &Path, base: Sections) -> (Sections, Option<FileOverrides>) {
    match read_overrides(path) {
        LoadOutcome::Missing => {
            debug!("No config file at {}, using defaults", path.display());
            (base, None)
        }
        LoadOutcome::Parsed(overrides) => {
            info!("Configuration loaded from {}", path.display());
            (overrides.apply(&base), Some(overrides))
        }
        LoadOutcome::Failed(e) => {
            warn!("Failed to load config file: {}", e);
            (base, None)
        }
    }
}

/// Overlay the file at `path` onto `base`
pub fn load_from_file(path: &Path, base: Sections) -> Sections {
    overlay_file(path, base).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("config/trading_config.json")
    }

    #[test]
    fn test_trading_overrides_keep_unnamed_fields() {
        let overrides = TradingOverrides {
            initial_capital: Some(500.0),
            timeframe: Some("5m".to_string()),
            ..Default::default()
        };

        let merged = overrides.apply(&TradingConfig::default());
        assert_eq!(merged.initial_capital, 500.0);
        assert_eq!(merged.timeframe, "5m");
        assert_eq!(
            TradingConfig {
                initial_capital: 10000.0,
                timeframe: "1m".to_string(),
                ..merged
            },
            TradingConfig::default()
        );
    }

    #[test]
    fn test_empty_overrides_are_identity() {
        let base = Sections::defaults(&HashMap::<String, String>::new());
        assert_eq!(FileOverrides::default().apply(&base), base);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let contents = r#"{
            "version": 2,
            "trading": { "stop_loss_pct": 0.05, "leverage": 10 },
            "api": { "telegram_chat_id": "99" }
        }"#;

        let overrides = parse_overrides(contents, &path()).unwrap();
        let trading = overrides.trading.unwrap();
        assert_eq!(trading.stop_loss_pct, Some(0.05));
        assert_eq!(trading.initial_capital, None);
        assert!(overrides.backend.is_none());
        assert_eq!(overrides.api.unwrap().telegram_chat_id.as_deref(), Some("99"));
    }

    #[test]
    fn test_parse_accepts_firebase_alias() {
        let contents = r#"{ "firebase": { "project_id": "legacy" } }"#;
        let overrides = parse_overrides(contents, &path()).unwrap();
        assert_eq!(
            overrides.backend.unwrap().project_id.as_deref(),
            Some("legacy")
        );
    }

    #[test]
    fn test_canonical_backend_key_wins_over_alias() {
        let contents = r#"{
            "firebase": { "project_id": "legacy" },
            "backend": { "project_id": "current" }
        }"#;
        let overrides = parse_overrides(contents, &path()).unwrap();
        assert_eq!(
            overrides.backend.unwrap().project_id.as_deref(),
            Some("current")
        );
    }

    #[test]
    fn test_null_backend_key_falls_through_to_alias() {
        let contents = r#"{
            "backend": null,
            "firebase": { "project_id": "legacy" }
        }"#;
        let overrides = parse_overrides(contents, &path()).unwrap();
        assert_eq!(
            overrides.backend.unwrap().project_id.as_deref(),
            Some("legacy")
        );
    }

    #[test]
    fn test_parse_rejects_wrong_field_type() {
        let contents = r#"{ "trading": { "initial_capital": "lots" } }"#;
        let err = parse_overrides(contents, &path()).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedFile { .. }));
        assert!(err.to_string().contains("trading"));
    }

    #[test]
    fn test_parse_rejects_non_object_documents() {
        assert!(parse_overrides("[1, 2, 3]", &path()).is_err());
        assert!(parse_overrides(r#"{ "api": "secret" }"#, &path()).is_err());
        assert!(parse_overrides("{ not json", &path()).is_err());
    }

    #[test]
    fn test_null_fields_are_absent() {
        let contents = r#"{ "trading": { "stop_loss_pct": null }, "backend": null }"#;
        let overrides = parse_overrides(contents, &path()).unwrap();
        assert_eq!(overrides.trading.unwrap().stop_loss_pct, None);
        assert!(overrides.backend.is_none());
    }

    #[test]
    fn test_named_fields() {
        let contents = r#"{ "trading": { "timeframe": "1h", "order_timeout": 10 } }"#;
        let overrides = parse_overrides(contents, &path()).unwrap();

        let mut named = overrides.named_fields(Section::Trading);
        named.sort();
        assert_eq!(named, vec!["order_timeout", "timeframe"]);
        assert!(overrides.named_fields(Section::Api).is_empty());
    }

    #[test]
    fn test_read_missing_file() {
        let outcome = read_overrides(Path::new("/definitely/not/here/config.json"));
        assert!(matches!(outcome, LoadOutcome::Missing));
    }
}
