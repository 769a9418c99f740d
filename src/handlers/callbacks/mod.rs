//! Callback query handlers module
//!
//! Button presses are routed in a fixed order: plugin-selection answers
//! first, then the longest registered prefix, otherwise the press is
//! reported as unhandled.

use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, warn};
use crate::handlers::commands::{CommandPipeline, InterceptState};
use crate::models::{CallbackEvent, CommandEvent, Notice, SelectionCallback, PLUGIN_SELECT_PREFIX};
use crate::services::Renderer;
use crate::utils::errors::{TradePilotError, Result};
use crate::utils::logging::log_callback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Handled,
    Unhandled,
}

/// Handler for one callback prefix
#[async_trait]
pub trait CallbackHandler: Send + Sync {
    /// `args` is the callback data with the prefix removed. Return
    /// `Unhandled` when the payload is not understood.
    async fn handle(&self, event: &CallbackEvent, args: &str) -> Result<CallbackOutcome>;
}

pub struct CallbackRouter {
    pipeline: Arc<CommandPipeline>,
    renderer: Arc<dyn Renderer>,
    /// Sorted longest prefix first
    handlers: Vec<(String, Arc<dyn CallbackHandler>)>,
    max_data_len: usize,
}

impl CallbackRouter {
    pub fn new(pipeline: Arc<CommandPipeline>, renderer: Arc<dyn Renderer>, max_data_len: usize) -> Self {
        Self {
            pipeline,
            renderer,
            handlers: Vec::new(),
            max_data_len,
        }
    }

    /// Register a handler for callbacks starting with `prefix`
    pub fn register(&mut self, prefix: &str, handler: Arc<dyn CallbackHandler>) -> Result<()> {
        if prefix.is_empty() {
            return Err(TradePilotError::InvalidInput("Callback prefix must not be empty".to_string()));
        }
        if prefix == PLUGIN_SELECT_PREFIX || self.handlers.iter().any(|(p, _)| p == prefix) {
            return Err(TradePilotError::DuplicatePrefix(prefix.to_string()));
        }

        self.handlers.push((prefix.to_string(), handler));
        self.handlers.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Ok(())
    }

    pub fn with_handler(mut self, prefix: &str, handler: Arc<dyn CallbackHandler>) -> Result<Self> {
        self.register(prefix, handler)?;
        Ok(self)
    }

    pub fn prefixes(&self) -> Vec<&str> {
        self.handlers.iter().map(|(p, _)| p.as_str()).collect()
    }

    /// Dispatch one button press
    pub async fn route(&self, event: &CallbackEvent) -> Result<CallbackOutcome> {
        let outcome = self.dispatch(event).await?;
        log_callback(event.user_id, &event.data, outcome == CallbackOutcome::Handled);
        Ok(outcome)
    }

    async fn dispatch(&self, event: &CallbackEvent) -> Result<CallbackOutcome> {
        if event.data.len() > self.max_data_len {
            warn!(
                user_id = event.user_id,
                len = event.data.len(),
                limit = self.max_data_len,
                "Callback data exceeds limit"
            );
            return Ok(CallbackOutcome::Unhandled);
        }

        if let Some(args) = event.data.strip_prefix(PLUGIN_SELECT_PREFIX) {
            return self.handle_selection(event, args).await;
        }

        let matched = self
            .handlers
            .iter()
            .find(|(prefix, _)| event.data.starts_with(prefix.as_str()));

        match matched {
            Some((prefix, handler)) => {
                debug!(user_id = event.user_id, prefix = %prefix, "Dispatching callback");
                handler.handle(event, &event.data[prefix.len()..]).await
            }
            None => Ok(CallbackOutcome::Unhandled),
        }
    }

    async fn handle_selection(&self, event: &CallbackEvent, args: &str) -> Result<CallbackOutcome> {
        let Some(selection) = SelectionCallback::parse(args) else {
            warn!(user_id = event.user_id, callback_data = %event.data, "Malformed plugin selection");
            return Ok(CallbackOutcome::Unhandled);
        };

        match selection {
            SelectionCallback::Choose { plugin, command } => {
                let interceptor = self.pipeline.interceptor();
                if interceptor.classify(&command) != InterceptState::NeedsSelection {
                    warn!(user_id = event.user_id, command = %command, "Plugin selection for a command that takes none");
                    return Ok(CallbackOutcome::Unhandled);
                }
                if !interceptor.contexts().set_context(event.user_id, &plugin, &command) {
                    return Ok(CallbackOutcome::Unhandled);
                }

                let resumed = CommandEvent::new(event.user_id, &command, "");
                self.pipeline.run(&resumed, Some(event.message_id)).await?;
                Ok(CallbackOutcome::Handled)
            }
            SelectionCallback::Cancel { command } => {
                self.renderer
                    .show_notice(
                        event.user_id,
                        Some(event.message_id),
                        &Notice::SelectionCancelled { command },
                    )
                    .await?;
                Ok(CallbackOutcome::Handled)
            }
        }
    }
}
