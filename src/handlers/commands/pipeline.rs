//! Normal command path: intercept, resolve the plugin, execute

use std::sync::Arc;
use tracing::warn;
use crate::models::{CommandEvent, ExecuteRequest, Plugin};
use crate::services::Executor;
use crate::utils::errors::Result;
use super::interceptor::{CommandInterceptor, InterceptState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A selection menu was shown; the command resumes from its callback
    AwaitingSelection,
    Executed { plugin: Option<Plugin> },
}

pub struct CommandPipeline {
    interceptor: CommandInterceptor,
    executor: Arc<dyn Executor>,
    clear_after_execute: bool,
}

impl CommandPipeline {
    pub fn new(
        interceptor: CommandInterceptor,
        executor: Arc<dyn Executor>,
        clear_after_execute: bool,
    ) -> Self {
        Self {
            interceptor,
            executor,
            clear_after_execute,
        }
    }

    /// Run a command. `message_id` is set when the command is resumed from
    /// a button so the executor can edit that message.
    pub async fn run(&self, event: &CommandEvent, message_id: Option<i32>) -> Result<CommandOutcome> {
        let user_id = event.user_id;
        let command = event.command.as_str();

        if self.interceptor.intercept(command, user_id, &event.raw_args).await? {
            return Ok(CommandOutcome::AwaitingSelection);
        }

        let state = self.interceptor.classify(command);
        let plugin = match state {
            InterceptState::Passthrough => None,
            InterceptState::Implicit(plugin) => Some(plugin),
            InterceptState::NeedsSelection => match self.interceptor.contexts().get_context(user_id) {
                Some(plugin) => Some(plugin),
                None => {
                    // Expired between the check and the read; ask again.
                    warn!(user_id = user_id, command = command, "Plugin context vanished before execution");
                    self.interceptor.intercept(command, user_id, &event.raw_args).await?;
                    return Ok(CommandOutcome::AwaitingSelection);
                }
            },
        };

        let mut request = ExecuteRequest::new(user_id, command, event.raw_args.clone(), plugin);
        request.message_id = message_id;
        let result = self.executor.execute(request).await;

        if self.clear_after_execute && state == InterceptState::NeedsSelection {
            self.interceptor.contexts().clear_context(user_id);
        }

        result?;
        Ok(CommandOutcome::Executed { plugin })
    }

    pub fn interceptor(&self) -> &CommandInterceptor {
        &self.interceptor
    }
}
