//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap,
//! and the handlers that inspect and edit the configuration file.

use crate::config::env::{self, EnvSource};
use crate::config::loader::FileOverrides;
use crate::config::{ConfigManager, Section, Sections, DEFAULT_CONFIG_PATH};
use crate::error::{ConfigError, Result};
use crate::utils::format::{display_value, mask_secret, render_table};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tabled::Tabled;

/// Fields whose values are never printed in full
const SECRET_FIELDS: [&str; 3] = ["exchange_api_key", "exchange_api_secret", "telegram_bot_token"];

#[derive(Parser)]
#[command(name = "tradecfg")]
#[command(about = "Inspect and edit the trading application's configuration")]
#[command(version, author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH", env = "TRADECFG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored table output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved configuration and where each value came from
    Show {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Resolve and validate the configuration
    Validate,
    /// Show configuration file path
    Path,
    /// Set a configuration value (e.g. trading.stop_loss_pct 0.02)
    Set {
        /// Setting name as section.field
        key: String,
        /// Setting value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Write a configuration file populated with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn execute(self, env: &dyn EnvSource) -> Result<()> {
        let path = self.config;
        match self.command {
            Commands::Show { json } => execute_config_show(path, json, self.no_color, env),
            Commands::Validate => execute_config_validate(path, env),
            Commands::Path => execute_config_path(path),
            Commands::Set { key, value } => execute_config_set(path, &key, &value, env),
            Commands::Init { force } => execute_config_init(path, force, env),
        }
    }
}

#[derive(Tabled)]
struct ConfigItem {
    #[tabled(rename = "Setting")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

fn section_value(sections: &Sections, section: Section) -> Result<Value> {
    let value = match section {
        Section::Trading => serde_json::to_value(&sections.trading)?,
        Section::Backend => serde_json::to_value(&sections.backend)?,
        Section::Api => serde_json::to_value(&sections.api)?,
    };
    Ok(value)
}

/// Where a resolved value came from: file beats environment beats default
fn value_source(
    section: Section,
    field: &str,
    file_fields: &[String],
    env: &dyn EnvSource,
) -> &'static str {
    if file_fields.iter().any(|f| f == field) {
        return "file";
    }

    let from_env = section != Section::Trading
        && env::variable_for(field)
            .and_then(|name| env.var(name))
            .is_some();

    if from_env {
        "env"
    } else {
        "default"
    }
}

fn config_items(
    manager: &ConfigManager,
    overrides: Option<&FileOverrides>,
    env: &dyn EnvSource,
) -> Result<Vec<ConfigItem>> {
    let mut items = Vec::new();
    for section in Section::ALL {
        let file_fields = overrides
            .map(|o| o.named_fields(section))
            .unwrap_or_default();

        if let Value::Object(fields) = section_value(manager.sections(), section)? {
            for (field, value) in fields {
                let text = match &value {
                    Value::String(s) if is_secret(&field) => mask_secret(s),
                    Value::String(s) => display_value(s),
                    other => other.to_string(),
                };

                items.push(ConfigItem {
                    key: format!("{section}.{field}"),
                    value: text,
                    source: value_source(section, &field, &file_fields, env).to_string(),
                });
            }
        }
    }

    Ok(items)
}

fn execute_config_show(
    path: Option<PathBuf>,
    json: bool,
    no_color: bool,
    env: &dyn EnvSource,
) -> Result<()> {
    let (manager, overrides) = ConfigManager::load_with_overrides(path, env);

    if json {
        let mut sections = manager.sections().clone();
        sections.api.exchange_api_key = mask_secret(&sections.api.exchange_api_key);
        sections.api.exchange_api_secret = mask_secret(&sections.api.exchange_api_secret);
        sections.api.telegram_bot_token = mask_secret(&sections.api.telegram_bot_token);

        let json_output = serde_json::to_string_pretty(&sections).map_err(|e| {
            ConfigError::serialization(format!("Failed to serialize config: {e}"))
        })?;
        println!("{json_output}");
    } else {
        let items = config_items(&manager, overrides.as_ref(), env)?;
        println!("{}", render_table(&items, no_color));
    }

    Ok(())
}

fn execute_config_validate(path: Option<PathBuf>, env: &dyn EnvSource) -> Result<()> {
    let manager = ConfigManager::with_env(path, env)?;

    println!("✅ Configuration is valid: {}", manager.path().display());
    if !manager.api().has_exchange_credentials() {
        println!(
            "⚠️  Missing {}: live trading is disabled",
            manager.api().missing_exchange_credentials().join(", ")
        );
    }

    Ok(())
}

fn resolve_path(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn is_secret(field: &str) -> bool {
    SECRET_FIELDS.iter().any(|f| *f == field)
}

fn execute_config_path(path: Option<PathBuf>) -> Result<()> {
    println!("{}", resolve_path(path).display());
    Ok(())
}

/// Split `section.field`
fn parse_key(key: &str) -> Result<(Section, &str)> {
    let (section, field) = key.split_once('.').ok_or_else(|| {
        ConfigError::invalid_argument(format!(
            "Invalid configuration key: {key}. Expected section.field, e.g. trading.timeframe"
        ))
    })?;

    let section = section.parse::<Section>().map_err(ConfigError::invalid_argument)?;
    Ok((section, field))
}

fn execute_config_set(
    path: Option<PathBuf>,
    key: &str,
    value: &str,
    env: &dyn EnvSource,
) -> Result<()> {
    let (section, field) = parse_key(key)?;

    let mut manager = ConfigManager::load_unvalidated(path, env);
    manager.set_field(section, field, value)?;
    manager.save()?;

    let shown = if is_secret(field) {
        mask_secret(value)
    } else {
        value.to_string()
    };
    println!("✅ Configuration updated: {section}.{field} = {shown}");

    Ok(())
}

fn execute_config_init(path: Option<PathBuf>, force: bool, env: &dyn EnvSource) -> Result<()> {
    let path = resolve_path(path);

    // Don't overwrite existing configuration
    if path.exists() && !force {
        println!(
            "Configuration already exists at {} (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }

    let manager = ConfigManager::with_sections(path, Sections::defaults(env));
    manager.save()?;
    println!("✅ Configuration written to {}", manager.path().display());

    Ok(())
}
