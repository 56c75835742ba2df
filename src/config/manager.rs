//! Configuration manager
//!
//! Resolves the three sections once at startup (defaults, then environment,
//! then the config file), validates them, and writes them back on request.

use crate::config::env::{EnvSource, ProcessEnv};
use crate::config::loader::{overlay_file, FileOverrides};
use crate::config::settings::{ApiConfig, BackendConfig, Section, Sections, TradingConfig};
use crate::config::validator::validate_all;
use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path used when none is given
pub const DEFAULT_CONFIG_PATH: &str = "config/trading_config.json";

/// Owner of the resolved configuration
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    sections: Sections,
}

impl ConfigManager {
    /// Resolve and validate using the process environment
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        Self::with_env(path, &ProcessEnv)
    }

    /// Resolve and validate using `env` for environment-sourced fields.
    ///
    /// Fails only when validation fails; file problems are logged and skipped.
    pub fn with_env(path: Option<PathBuf>, env: &dyn EnvSource) -> Result<Self> {
        let manager = Self::load_unvalidated(path, env);
        manager.validate()?;
        Ok(manager)
    }

    /// Resolve without validating, for commands that edit the configuration
    pub fn load_unvalidated(path: Option<PathBuf>, env: &dyn EnvSource) -> Self {
        Self::load_with_overrides(path, env).0
    }

    /// Resolve without validating, also returning the file overrides that
    /// were applied (`None` when the file was missing or skipped)
    pub fn load_with_overrides(
        path: Option<PathBuf>,
        env: &dyn EnvSource,
    ) -> (Self, Option<FileOverrides>) {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let (sections, overrides) = overlay_file(&path, Sections::defaults(env));
        (Self { path, sections }, overrides)
    }

    /// Wrap already-resolved sections without touching the file
    pub fn with_sections(path: PathBuf, sections: Sections) -> Self {
        Self { path, sections }
    }

    /// Run every section's rule again, in order
    pub fn validate(&self) -> Result<()> {
        validate_all(&self.sections)
    }

    /// Write the in-memory sections to the resolved path.
    ///
    /// No validation happens here; an edited but unvalidated state is
    /// persisted as is. Non-finite numbers are refused because JSON cannot
    /// hold them and they would reload as defaults.
    pub fn save(&self) -> Result<()> {
        if let Some(field) = self.sections.trading.non_finite_field() {
            return Err(ConfigError::serialization(format!(
                "Failed to serialize config: trading.{field} is not a finite number"
            )));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(&self.sections)
            .map_err(|e| ConfigError::serialization(format!("Failed to serialize config: {e}")))?;

        std::fs::write(&self.path, contents)?;

        debug!("Saved configuration to: {}", self.path.display());
        Ok(())
    }

    /// Assign `raw` to `section.field`, parsed as that field's type.
    ///
    /// Only the in-memory value changes; call `save` to persist it.
    pub fn set_field(&mut self, section: Section, field: &str, raw: &str) -> Result<()> {
        match section {
            Section::Trading => {
                self.sections.trading = with_field(&self.sections.trading, section, field, raw)?
            }
            Section::Backend => {
                self.sections.backend = with_field(&self.sections.backend, section, field, raw)?
            }
            Section::Api => self.sections.api = with_field(&self.sections.api, section, field, raw)?,
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn trading(&self) -> &TradingConfig {
        &self.sections.trading
    }

    pub fn backend(&self) -> &BackendConfig {
        &self.sections.backend
    }

    pub fn api(&self) -> &ApiConfig {
        &self.sections.api
    }

    pub fn trading_mut(&mut self) -> &mut TradingConfig {
        &mut self.sections.trading
    }

    pub fn backend_mut(&mut self) -> &mut BackendConfig {
        &mut self.sections.backend
    }

    pub fn api_mut(&mut self) -> &mut ApiConfig {
        &mut self.sections.api
    }
}

fn with_field<T: Serialize + DeserializeOwned>(
    current: &T,
    section: Section,
    field: &str,
    raw: &str,
) -> Result<T> {
    let mut value = serde_json::to_value(current)?;
    let fields = value
        .as_object_mut()
        .ok_or_else(|| ConfigError::serialization(format!("{section} is not a record")))?;

    let slot = fields.get_mut(field).ok_or_else(|| {
        ConfigError::invalid_argument(format!("Unknown configuration key: {section}.{field}"))
    })?;

    let invalid = || ConfigError::invalid_argument(format!("Invalid value for {section}.{field}: {raw}"));
    let replacement = match &*slot {
        Value::String(_) => Value::String(raw.to_string()),
        Value::Number(n) if n.is_f64() => {
            let parsed = raw.parse::<f64>().map_err(|_| invalid())?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(invalid)?
        }
        Value::Number(_) => Value::Number(raw.parse::<u64>().map_err(|_| invalid())?.into()),
        _ => return Err(invalid()),
    };
    *slot = replacement;

    serde_json::from_value(value).map_err(|_| invalid())
}
