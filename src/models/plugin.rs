//! Trading plugin identifiers

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::utils::errors::TradePilotError;

/// Trading sub-system a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plugin {
    V3,
    V6,
    Both,
}

impl Plugin {
    /// Options offered by a selection menu, in display order
    pub const ALL: [Plugin; 3] = [Plugin::V3, Plugin::V6, Plugin::Both];

    /// Wire form used in callback data and flow data
    pub fn as_str(&self) -> &'static str {
        match self {
            Plugin::V3 => "v3",
            Plugin::V6 => "v6",
            Plugin::Both => "both",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Plugin::V3 => "V3",
            Plugin::V6 => "V6",
            Plugin::Both => "BOTH",
        }
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Plugin {
    type Err = TradePilotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v3" => Ok(Plugin::V3),
            "v6" => Ok(Plugin::V6),
            "both" => Ok(Plugin::Both),
            _ => Err(TradePilotError::InvalidPluginValue(s.to_string())),
        }
    }
}
