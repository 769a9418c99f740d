//! Command classification table
//!
//! Every known command maps to exactly one [`CommandClass`]. The table is
//! built once at startup (built-in lists plus configuration) and is
//! read-only afterwards. Unknown commands classify as
//! [`CommandClass::NotPluginAware`].

use std::collections::HashMap;
use std::sync::OnceLock;
use regex::Regex;
use crate::config::CommandsConfig;
use crate::models::{normalize_command, Plugin};
use crate::utils::errors::{TradePilotError, Result};

/// Telegram's rule for bot command names
const COMMAND_NAME_PATTERN: &str = r"^[a-z0-9_]{1,32}$";

static COMMAND_NAME: OnceLock<Regex> = OnceLock::new();

pub fn is_valid_command_name(name: &str) -> bool {
    COMMAND_NAME
        .get_or_init(|| Regex::new(COMMAND_NAME_PATTERN).expect("command name pattern compiles"))
        .is_match(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandClass {
    NotPluginAware,
    ExplicitSelectionRequired,
    ImplicitV3,
    ImplicitV6,
}

impl CommandClass {
    /// Plugin implied by the command name alone
    pub fn implied_plugin(&self) -> Option<Plugin> {
        match self {
            CommandClass::ImplicitV3 => Some(Plugin::V3),
            CommandClass::ImplicitV6 => Some(Plugin::V6),
            _ => None,
        }
    }
}

const PLUGIN_AWARE: &[&str] = &[
    // trading
    "buy", "sell", "positions", "close", "closeall", "orders", "pnl", "trades", "history",
    // risk
    "setlot", "setsl", "settp", "risktier", "lotsize", "slsystem", "riskstatus", "maxloss",
    "maxprofit", "dailylimit",
    // re-entry and recovery
    "slhunt", "tpcontinue", "reentry", "recovery", "cooldown", "chains", "autonomous",
    "profitbooking", "profit_chains",
    // analytics
    "daily", "weekly", "monthly", "compare", "performance", "stats", "winrate", "drawdown",
    "export", "report",
    // timeframes and sessions
    "timeframe", "trends", "sessions", "sessionstatus",
];

const V3_ONLY: &[&str] = &[
    "logic1", "logic2", "logic3", "v3", "v3status", "v3_toggle", "v3_config", "v3_signals",
];

const V6_ONLY: &[&str] = &[
    "v6", "v6_status", "v6_control", "v6_config", "v6_performance", "v6_signals",
    "tf15m_on", "tf15m_off", "tf30m_on", "tf30m_off", "tf1h_on", "tf1h_off",
    "tf4h_on", "tf4h_off",
];

const PASSTHROUGH: &[&str] = &[
    "start", "help", "menu", "status", "pause", "resume", "health", "version", "settings",
    "cancel",
];

/// Static command -> class lookup
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    classes: HashMap<String, CommandClass>,
}

impl CommandTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in lists
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (names, class) in [
            (PLUGIN_AWARE, CommandClass::ExplicitSelectionRequired),
            (V3_ONLY, CommandClass::ImplicitV3),
            (V6_ONLY, CommandClass::ImplicitV6),
            (PASSTHROUGH, CommandClass::NotPluginAware),
        ] {
            for name in names {
                table.classes.insert(name.to_string(), class);
            }
        }
        table
    }

    /// The built-in lists with configured entries merged on top
    pub fn from_config(config: &CommandsConfig) -> Result<Self> {
        let mut table = Self::builtin();
        for (names, class) in [
            (&config.plugin_aware, CommandClass::ExplicitSelectionRequired),
            (&config.v3_only, CommandClass::ImplicitV3),
            (&config.v6_only, CommandClass::ImplicitV6),
            (&config.passthrough, CommandClass::NotPluginAware),
        ] {
            for name in names {
                table.insert(name, class)?;
            }
        }
        Ok(table)
    }

    /// Add or reclassify a command
    pub fn insert(&mut self, name: &str, class: CommandClass) -> Result<()> {
        let name = normalize_command(name);
        if !is_valid_command_name(&name) {
            return Err(TradePilotError::Config(format!("Invalid command name: '{}'", name)));
        }
        self.classes.insert(name, class);
        Ok(())
    }

    /// Look up a command; `/Buy@bot` and `buy` are the same entry
    pub fn classify(&self, name: &str) -> CommandClass {
        self.classes
            .get(&normalize_command(name))
            .copied()
            .unwrap_or(CommandClass::NotPluginAware)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(&normalize_command(name))
    }

    /// Commands of one class, sorted
    pub fn commands_in(&self, class: CommandClass) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .classes
            .iter()
            .filter(|(_, c)| **c == class)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
