//! TradePilot Telegram Bot
//!
//! Command dispatching core for a trading assistant bot. Decides which
//! trading plugin (V3, V6 or both) a command targets, walks users through
//! button-driven parameter wizards, and routes button presses back into the
//! right command or wizard. Rendering and trade execution are supplied by
//! collaborators behind the `Renderer` and `Executor` traits.

#![allow(non_snake_case)]

pub mod config;
pub mod dispatcher;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{TradePilotError, Result};

// Re-export main components for easy access
pub use dispatcher::{BotDispatcher, DispatcherBuilder, DispatcherStats};
pub use handlers::{CallbackOutcome, CommandOutcome};
pub use models::{CallbackEvent, CommandEvent, ExecuteRequest, Plugin, UserId};
pub use services::{Executor, Renderer};
pub use state::{ConversationStateManager, PluginContextManager};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
