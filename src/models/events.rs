//! Inbound events and outbound collaborator requests
//!
//! Inbound events are already parsed from the transport; outbound requests
//! are handed to the renderer and executor collaborators.

use serde::Serialize;
use serde_json::{Map, Value};
use super::callback::plugin_selection_data;
use super::{Plugin, UserId};

/// Normalize a command name: strip the leading slash and any `@botname`
/// suffix, then lowercase.
pub fn normalize_command(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix('/').unwrap_or(name);
    let name = name.split('@').next().unwrap_or(name);
    name.to_lowercase()
}

/// Incoming slash-command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandEvent {
    pub user_id: UserId,
    pub command: String,
    pub raw_args: String,
}

impl CommandEvent {
    pub fn new(user_id: UserId, command: impl AsRef<str>, raw_args: impl Into<String>) -> Self {
        Self {
            user_id,
            command: normalize_command(command.as_ref()),
            raw_args: raw_args.into(),
        }
    }

    /// Parse message text such as `/buy@TradeBot EURUSD 0.05`.
    /// Returns `None` for text that is not a command.
    pub fn parse(user_id: UserId, text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };

        let command = normalize_command(head);
        if command.is_empty() {
            return None;
        }

        Some(Self {
            user_id,
            command,
            raw_args: rest.to_string(),
        })
    }
}

/// Incoming inline-button press
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackEvent {
    pub user_id: UserId,
    pub message_id: i32,
    pub data: String,
}

impl CallbackEvent {
    pub fn new(user_id: UserId, message_id: i32, data: impl Into<String>) -> Self {
        Self {
            user_id,
            message_id,
            data: data.into(),
        }
    }
}

/// Request to show the plugin selection menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSelectionRequest {
    pub user_id: UserId,
    pub original_command: String,
    pub options: Vec<Plugin>,
}

impl PluginSelectionRequest {
    pub fn new(user_id: UserId, original_command: impl Into<String>) -> Self {
        Self {
            user_id,
            original_command: original_command.into(),
            options: Plugin::ALL.to_vec(),
        }
    }

    /// Callback data for the button that selects `plugin`
    pub fn callback_data(&self, plugin: Plugin) -> String {
        plugin_selection_data(plugin, &self.original_command)
    }
}

/// Request to run a command once its context is resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteRequest {
    pub user_id: UserId,
    pub command_name: String,
    pub raw_args: String,
    pub resolved_plugin: Option<Plugin>,
    /// Parameters collected by a wizard, in collection order
    pub params: Map<String, Value>,
    /// Message to edit in place, when the command was resumed from a button
    pub message_id: Option<i32>,
}

impl ExecuteRequest {
    pub fn new(
        user_id: UserId,
        command_name: impl Into<String>,
        raw_args: impl Into<String>,
        resolved_plugin: Option<Plugin>,
    ) -> Self {
        Self {
            user_id,
            command_name: command_name.into(),
            raw_args: raw_args.into(),
            resolved_plugin,
            params: Map::new(),
            message_id: None,
        }
    }
}

/// What a wizard prompt asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FlowStage {
    /// Pick one of `options` for `key`
    Choose {
        step: usize,
        total_steps: usize,
        key: String,
        label: String,
        options: Vec<String>,
    },
    /// Confirm the collected parameters
    Confirm {
        total_steps: usize,
        params: Vec<(String, String)>,
    },
}

/// Request to render the current wizard step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowPrompt {
    pub user_id: UserId,
    pub message_id: Option<i32>,
    pub command: String,
    pub title: String,
    pub breadcrumb: Vec<String>,
    pub stage: FlowStage,
}

/// Short informational message for the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    SelectionCancelled { command: String },
    FlowCancelled { command: String },
    /// A wizard button was pressed after its flow ended
    FlowExpired,
}
