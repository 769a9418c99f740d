//! Services module
//!
//! The dispatcher core never renders menus or places trades itself. It
//! talks to a [`Renderer`] and an [`Executor`]; this module defines both
//! seams and ships the Telegram and in-memory implementations.

pub mod recording;
pub mod telegram;

pub use recording::{RecordingExecutor, RecordingRenderer, RenderedEvent};
pub use telegram::{AcknowledgingExecutor, TelegramRenderer};

use async_trait::async_trait;
use crate::models::{ExecuteRequest, FlowPrompt, Notice, PluginSelectionRequest, UserId};
use crate::utils::errors::Result;

/// Builds and sends button menus
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Ask the user which plugin the command targets
    async fn show_plugin_selection(&self, request: &PluginSelectionRequest) -> Result<()>;

    /// Show the current wizard step
    async fn show_flow_prompt(&self, prompt: &FlowPrompt) -> Result<()>;

    async fn show_notice(&self, user_id: UserId, message_id: Option<i32>, notice: &Notice) -> Result<()>;
}

/// Runs a command once its plugin context is resolved
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, request: ExecuteRequest) -> Result<()>;
}
