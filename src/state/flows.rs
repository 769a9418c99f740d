//! Wizard definitions
//!
//! A wizard collects command parameters through button choices only. Each
//! step offers a fixed option list; after the last step the user confirms.

use std::collections::{HashMap, HashSet};
use serde::Serialize;
use crate::models::{FlowAction, CALLBACK_DATA_LIMIT};
use crate::utils::errors::{TradePilotError, Result};

/// Data key holding the resolved plugin inside a wizard
pub const PLUGIN_KEY: &str = "plugin";

/// One button-choice step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStep {
    /// Data key the choice is stored under
    pub key: String,
    /// Prompt shown above the buttons
    pub label: String,
    pub options: Vec<String>,
}

impl FlowStep {
    pub fn new(key: &str, label: &str, options: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

/// A complete wizard for one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowDefinition {
    pub command: String,
    pub title: String,
    /// Values fixed by the command itself, stored before the first step
    pub preset: Vec<(String, String)>,
    pub steps: Vec<FlowStep>,
}

impl FlowDefinition {
    pub fn step(&self, index: usize) -> Option<&FlowStep> {
        self.steps.get(index)
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Check that `value` is one of the options of step `index`
    pub fn accepts(&self, index: usize, value: &str) -> bool {
        self.step(index)
            .map_or(false, |step| step.options.iter().any(|o| o == value))
    }

    /// Check keys are unique and every button payload fits the transport
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(TradePilotError::Config(format!("Flow '{}' has no steps", self.command)));
        }

        let mut keys = HashSet::new();
        keys.insert(PLUGIN_KEY);
        for (key, _) in &self.preset {
            if !keys.insert(key.as_str()) {
                return Err(TradePilotError::Config(format!(
                    "Flow '{}' repeats data key '{}'", self.command, key
                )));
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            if !keys.insert(step.key.as_str()) {
                return Err(TradePilotError::Config(format!(
                    "Flow '{}' repeats data key '{}'", self.command, step.key
                )));
            }
            if step.options.is_empty() {
                return Err(TradePilotError::Config(format!(
                    "Flow '{}' step '{}' has no options", self.command, step.key
                )));
            }
            for option in &step.options {
                let data = FlowAction::Pick { step: index, value: option.clone() }.to_callback_data();
                if data.len() > CALLBACK_DATA_LIMIT {
                    return Err(TradePilotError::CallbackTooLong {
                        len: data.len(),
                        limit: CALLBACK_DATA_LIMIT,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Registry of available wizards, keyed by command
#[derive(Debug, Clone)]
pub struct FlowRegistry {
    flows: HashMap<String, FlowDefinition>,
}

impl FlowRegistry {
    /// Create a registry with the built-in trading wizards
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_default_flows();
        registry
    }

    pub fn empty() -> Self {
        Self {
            flows: HashMap::new(),
        }
    }

    fn register_default_flows(&mut self) {
        for flow in [
            create_order_flow("buy", "Buy Order", "BUY"),
            create_order_flow("sell", "Sell Order", "SELL"),
            create_setlot_flow(),
        ] {
            self.flows.insert(flow.command.clone(), flow);
        }
    }

    /// Register a wizard, replacing any existing one for the same command
    pub fn register(&mut self, flow: FlowDefinition) -> Result<()> {
        flow.validate()?;
        self.flows.insert(flow.command.clone(), flow);
        Ok(())
    }

    pub fn get(&self, command: &str) -> Option<&FlowDefinition> {
        self.flows.get(command)
    }

    pub fn has_flow(&self, command: &str) -> bool {
        self.flows.contains_key(command)
    }

    pub fn commands(&self) -> Vec<&str> {
        let mut commands: Vec<&str> = self.flows.keys().map(String::as_str).collect();
        commands.sort_unstable();
        commands
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const SYMBOLS: &[&str] = &["EURUSD", "GBPUSD", "USDJPY", "XAUUSD", "AUDUSD", "USDCAD"];
const LOT_SIZES: &[&str] = &["0.01", "0.02", "0.05", "0.10", "0.20", "0.50"];

fn create_order_flow(command: &str, title: &str, direction: &str) -> FlowDefinition {
    FlowDefinition {
        command: command.to_string(),
        title: title.to_string(),
        preset: vec![("direction".to_string(), direction.to_string())],
        steps: vec![
            FlowStep::new("symbol", "Select symbol", SYMBOLS),
            FlowStep::new("lot", "Select lot size", LOT_SIZES),
        ],
    }
}

fn create_setlot_flow() -> FlowDefinition {
    FlowDefinition {
        command: "setlot".to_string(),
        title: "Set Lot Size".to_string(),
        preset: Vec::new(),
        steps: vec![FlowStep::new("lotsize", "Select new lot size", LOT_SIZES)],
    }
}
