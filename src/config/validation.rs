//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all settings are usable before the dispatcher is built.

use std::collections::HashMap;
use crate::handlers::commands::classification::is_valid_command_name;
use crate::models::{normalize_command, CALLBACK_DATA_LIMIT};
use crate::utils::errors::{TradePilotError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_logging_config(&settings.logging)?;
    validate_plugin_context_config(&settings.plugin_context)?;
    validate_commands_config(&settings.commands)?;
    validate_callbacks_config(&settings.callbacks)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if let Some(id) = config.allowed_user_ids.iter().find(|id| **id <= 0) {
        return Err(TradePilotError::Config(
            format!("Invalid allowed user id: {}", id)
        ));
    }

    Ok(())
}

/// The token is only needed to actually connect to Telegram
pub(super) fn validate_token(config: &super::BotConfig) -> Result<()> {
    if config.token.trim().is_empty() {
        return Err(TradePilotError::Config(
            "Bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(TradePilotError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(TradePilotError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.file_name.is_empty() {
        return Err(TradePilotError::Config(
            "Log file name is required".to_string()
        ));
    }

    Ok(())
}

/// Validate plugin context configuration
fn validate_plugin_context_config(config: &super::PluginContextConfig) -> Result<()> {
    if config.expiry_seconds <= 0 {
        return Err(TradePilotError::Config(
            "Plugin context expiry must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate command classification overrides
fn validate_commands_config(config: &super::CommandsConfig) -> Result<()> {
    let classes = [
        ("plugin_aware", &config.plugin_aware),
        ("v3_only", &config.v3_only),
        ("v6_only", &config.v6_only),
        ("passthrough", &config.passthrough),
    ];

    let mut seen: HashMap<String, &str> = HashMap::new();
    for (class, names) in classes {
        for raw in names.iter() {
            let name = normalize_command(raw);
            if !is_valid_command_name(&name) {
                return Err(TradePilotError::Config(
                    format!("Invalid command name in commands.{}: '{}'", class, raw)
                ));
            }
            if let Some(previous) = seen.insert(name.clone(), class) {
                if previous != class {
                    return Err(TradePilotError::Config(
                        format!("Command '{}' listed under both commands.{} and commands.{}", name, previous, class)
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Validate callback configuration
fn validate_callbacks_config(config: &super::CallbacksConfig) -> Result<()> {
    if config.max_data_len == 0 || config.max_data_len > CALLBACK_DATA_LIMIT {
        return Err(TradePilotError::Config(
            format!("Callback data limit must be between 1 and {}", CALLBACK_DATA_LIMIT)
        ));
    }

    Ok(())
}
