//! Data models module
//!
//! This module contains the plain data exchanged between the dispatcher
//! core and its collaborators.

pub mod callback;
pub mod events;
pub mod plugin;

/// Telegram user id; in a private chat it doubles as the chat id
pub type UserId = i64;

// Re-export commonly used models
pub use callback::{FlowAction, SelectionCallback, CALLBACK_DATA_LIMIT, FLOW_PREFIX, PLUGIN_SELECT_PREFIX};
pub use events::{
    normalize_command, CallbackEvent, CommandEvent, ExecuteRequest, FlowPrompt, FlowStage, Notice,
    PluginSelectionRequest,
};
pub use plugin::Plugin;
