//! Callback data grammar
//!
//! Button payloads are plain strings capped at [`CALLBACK_DATA_LIMIT`] bytes.
//! Two families are produced by this crate:
//!
//! - plugin selection: `plugin_select_<v3|v6|both>_<command>` and
//!   `plugin_select_cancel_<command>`
//! - wizard steps: `flow_pick_<step>_<value>`, `flow_back_<step>`,
//!   `flow_confirm`, `flow_cancel`

use super::Plugin;

/// Telegram's payload ceiling for inline button data, in bytes
pub const CALLBACK_DATA_LIMIT: usize = 64;

pub const PLUGIN_SELECT_PREFIX: &str = "plugin_select_";
pub const FLOW_PREFIX: &str = "flow_";

const CANCEL_TOKEN: &str = "cancel";

/// Parsed plugin-selection payload (the part after [`PLUGIN_SELECT_PREFIX`])
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCallback {
    /// The plugin token is kept raw; it is validated when stored
    Choose { plugin: String, command: String },
    Cancel { command: String },
}

impl SelectionCallback {
    pub fn parse(args: &str) -> Option<Self> {
        let (token, command) = args.split_once('_')?;
        if token.is_empty() || command.is_empty() {
            return None;
        }

        if token == CANCEL_TOKEN {
            Some(SelectionCallback::Cancel { command: command.to_string() })
        } else {
            Some(SelectionCallback::Choose {
                plugin: token.to_string(),
                command: command.to_string(),
            })
        }
    }
}

pub fn plugin_selection_data(plugin: Plugin, command: &str) -> String {
    format!("{}{}_{}", PLUGIN_SELECT_PREFIX, plugin.as_str(), command)
}

pub fn selection_cancel_data(command: &str) -> String {
    format!("{}{}_{}", PLUGIN_SELECT_PREFIX, CANCEL_TOKEN, command)
}

/// Parsed wizard payload (the part after [`FLOW_PREFIX`])
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowAction {
    Pick { step: usize, value: String },
    Back { step: usize },
    Confirm,
    Cancel,
}

impl FlowAction {
    pub fn parse(args: &str) -> Option<Self> {
        match args {
            "confirm" => return Some(FlowAction::Confirm),
            "cancel" => return Some(FlowAction::Cancel),
            _ => {}
        }

        let (verb, rest) = args.split_once('_')?;
        match verb {
            "pick" => {
                let (step, value) = rest.split_once('_')?;
                if value.is_empty() {
                    return None;
                }
                Some(FlowAction::Pick {
                    step: step.parse().ok()?,
                    value: value.to_string(),
                })
            }
            "back" => Some(FlowAction::Back { step: rest.parse().ok()? }),
            _ => None,
        }
    }

    /// Full callback data for this action, prefix included
    pub fn to_callback_data(&self) -> String {
        match self {
            FlowAction::Pick { step, value } => format!("{}pick_{}_{}", FLOW_PREFIX, step, value),
            FlowAction::Back { step } => format!("{}back_{}", FLOW_PREFIX, step),
            FlowAction::Confirm => format!("{}confirm", FLOW_PREFIX),
            FlowAction::Cancel => format!("{}cancel", FLOW_PREFIX),
        }
    }
}
