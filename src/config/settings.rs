//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::models::CALLBACK_DATA_LIMIT;
use crate::state::DEFAULT_EXPIRY_SECONDS;
use crate::utils::errors::{TradePilotError, Result};

/// Main application configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub bot: BotConfig,
    pub logging: LoggingConfig,
    pub plugin_context: PluginContextConfig,
    pub commands: CommandsConfig,
    pub callbacks: CallbacksConfig,
    pub flows: FlowsConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    pub token: String,
    /// Users allowed to talk to the bot; empty allows everyone
    pub allowed_user_ids: Vec<i64>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for the daily-rolling log file
    pub file_path: String,
    pub file_name: String,
    /// Emit JSON lines on stdout instead of plain text
    pub json: bool,
}

/// Plugin selection memory
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginContextConfig {
    pub expiry_seconds: i64,
    /// Forget a selection once the command that asked for it has run
    pub clear_after_execute: bool,
}

/// Extra command classifications merged over the built-in table
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandsConfig {
    pub plugin_aware: Vec<String>,
    pub v3_only: Vec<String>,
    pub v6_only: Vec<String>,
    pub passthrough: Vec<String>,
}

/// Callback routing configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CallbacksConfig {
    pub max_data_len: usize,
}

/// Wizard configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FlowsConfig {
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: "logs".to_string(),
            file_name: "tradepilot.log".to_string(),
            json: false,
        }
    }
}

impl Default for PluginContextConfig {
    fn default() -> Self {
        Self {
            expiry_seconds: DEFAULT_EXPIRY_SECONDS,
            clear_after_execute: false,
        }
    }
}

impl Default for CallbacksConfig {
    fn default() -> Self {
        Self {
            max_data_len: CALLBACK_DATA_LIMIT,
        }
    }
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Settings {
    /// Load settings from `config.toml` (optional) and `TRADEPILOT__*`
    /// environment variables, e.g. `TRADEPILOT__BOT__TOKEN`
    pub fn new() -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("TRADEPILOT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.allowed_user_ids")
                    .with_list_parse_key("commands.plugin_aware")
                    .with_list_parse_key("commands.v3_only")
                    .with_list_parse_key("commands.v6_only")
                    .with_list_parse_key("commands.passthrough")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Parse settings from a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TradePilotError::Config(format!("Invalid TOML configuration: {}", e)))
    }

    /// Read and parse a TOML settings file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_settings(self)
    }

    /// Validate everything the binary needs, including the bot token
    pub fn validate_for_runtime(&self) -> Result<()> {
        self.validate()?;
        super::validation::validate_token(&self.bot)
    }

    /// Expiry window for remembered plugin selections
    pub fn context_expiry(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.plugin_context.expiry_seconds)
    }
}
