//! Plugin disambiguation decision point
//!
//! For every incoming command the interceptor decides whether it can run
//! now or must first wait for the user to pick a plugin.

use std::sync::Arc;
use crate::models::{normalize_command, Plugin, PluginSelectionRequest, UserId};
use crate::services::Renderer;
use crate::state::PluginContextManager;
use crate::utils::errors::Result;
use crate::utils::logging::log_command;
use super::classification::{CommandClass, CommandTable};

/// Outcome of classifying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptState {
    /// Not plugin-aware; run unchanged
    Passthrough,
    /// The command name fixes the plugin
    Implicit(Plugin),
    /// Plugin-aware and ambiguous
    NeedsSelection,
}

pub struct CommandInterceptor {
    table: CommandTable,
    contexts: Arc<PluginContextManager>,
    renderer: Arc<dyn Renderer>,
}

impl CommandInterceptor {
    pub fn new(
        table: CommandTable,
        contexts: Arc<PluginContextManager>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            table,
            contexts,
            renderer,
        }
    }

    /// Pure table lookup
    pub fn classify(&self, command: &str) -> InterceptState {
        match self.table.classify(command) {
            CommandClass::NotPluginAware => InterceptState::Passthrough,
            CommandClass::ExplicitSelectionRequired => InterceptState::NeedsSelection,
            CommandClass::ImplicitV3 => InterceptState::Implicit(Plugin::V3),
            CommandClass::ImplicitV6 => InterceptState::Implicit(Plugin::V6),
        }
    }

    /// Plugin fixed by the command name, for implicit commands only
    pub fn get_implicit_context(&self, command: &str) -> Option<Plugin> {
        self.table.classify(command).implied_plugin()
    }

    /// Returns `true` when the command must halt because a selection menu
    /// was requested; `false` when it may run now.
    pub async fn intercept(&self, command: &str, user_id: UserId, _raw_args: &str) -> Result<bool> {
        let command = normalize_command(command);
        let command = command.as_str();
        match self.classify(command) {
            InterceptState::Passthrough => {
                log_command(user_id, command, "passthrough");
                Ok(false)
            }
            InterceptState::Implicit(plugin) => {
                log_command(user_id, command, plugin.as_str());
                Ok(false)
            }
            InterceptState::NeedsSelection => {
                if self.contexts.has_active_context(user_id) {
                    log_command(user_id, command, "sticky_context");
                    return Ok(false);
                }

                log_command(user_id, command, "needs_selection");
                let request = PluginSelectionRequest::new(user_id, command);
                self.renderer.show_plugin_selection(&request).await?;
                Ok(true)
            }
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn contexts(&self) -> &Arc<PluginContextManager> {
        &self.contexts
    }
}
