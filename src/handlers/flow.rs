//! Button-driven parameter wizards
//!
//! [`FlowEngine`] walks a user through a [`FlowDefinition`]. All state
//! changes go through [`ConversationStateManager::update_flow`]; rendering
//! and execution happen after the mutation returns. Every button carries
//! the step index it was rendered for, so a stale or doubled tap is ignored.

use std::sync::Arc;
use async_trait::async_trait;
use serde_json::Map;
use tracing::debug;
use crate::handlers::callbacks::{CallbackHandler, CallbackOutcome};
use crate::models::{CallbackEvent, ExecuteRequest, FlowAction, FlowPrompt, FlowStage, Notice, Plugin};
use crate::services::{Executor, Renderer};
use crate::state::flows::PLUGIN_KEY;
use crate::state::{ConversationState, ConversationStateManager, FlowDefinition, FlowRegistry};
use crate::utils::errors::Result;
use crate::utils::logging::log_flow_transition;

enum Transition {
    Expired,
    Stale,
    Prompt(FlowPrompt, usize),
    Confirm,
    Cancelled(String),
}

pub struct FlowEngine {
    states: Arc<ConversationStateManager>,
    flows: Arc<FlowRegistry>,
    renderer: Arc<dyn Renderer>,
    executor: Arc<dyn Executor>,
}

impl FlowEngine {
    pub fn new(
        states: Arc<ConversationStateManager>,
        flows: Arc<FlowRegistry>,
        renderer: Arc<dyn Renderer>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            states,
            flows,
            renderer,
            executor,
        }
    }

    pub fn has_flow(&self, command: &str) -> bool {
        self.flows.has_flow(command)
    }

    /// Start the wizard for `request.command_name` and render its first
    /// step. Returns `false` when the command has no wizard.
    pub async fn start(&self, request: &ExecuteRequest) -> Result<bool> {
        let Some(flow) = self.flows.get(&request.command_name) else {
            return Ok(false);
        };
        let user_id = request.user_id;

        self.states.start_flow(user_id, &flow.command);
        let prompt = self.states.update_flow(user_id, |state| {
            state.add_breadcrumb(&flow.title);
            if let Some(plugin) = request.resolved_plugin {
                state.add_data(PLUGIN_KEY, plugin.as_str());
                state.add_breadcrumb(plugin.label());
            }
            for (key, value) in &flow.preset {
                state.add_data(key, value.as_str());
            }
            build_prompt(flow, state, request.message_id)
        });

        log_flow_transition(user_id, &flow.command, 0, "start");
        self.renderer.show_flow_prompt(&prompt).await?;
        Ok(true)
    }

    /// Apply a wizard button press
    pub async fn apply(&self, event: &CallbackEvent, action: FlowAction) -> Result<CallbackOutcome> {
        let user_id = event.user_id;
        let message_id = Some(event.message_id);

        let transition = self.states.update_flow(user_id, |state| {
            let Some(flow) = state.command.as_deref().and_then(|c| self.flows.get(c)) else {
                state.reset();
                return Transition::Expired;
            };
            step_flow(flow, state, &action, message_id)
        });

        match transition {
            Transition::Expired => {
                debug!(user_id = user_id, "Flow callback without an active flow");
                self.renderer.show_notice(user_id, message_id, &Notice::FlowExpired).await?;
            }
            Transition::Stale => {
                debug!(user_id = user_id, action = ?action, "Ignoring stale flow callback");
            }
            Transition::Prompt(prompt, step) => {
                log_flow_transition(user_id, &prompt.command, step, "advance");
                self.renderer.show_flow_prompt(&prompt).await?;
            }
            Transition::Cancelled(command) => {
                log_flow_transition(user_id, &command, 0, "cancel");
                self.renderer
                    .show_notice(user_id, message_id, &Notice::FlowCancelled { command })
                    .await?;
            }
            Transition::Confirm => {
                let finished = self.states.complete_flow(user_id);
                match finished.command.clone() {
                    Some(command) => {
                        log_flow_transition(user_id, &command, finished.step, "confirm");
                        let request = build_request(finished, command, message_id);
                        self.executor.execute(request).await?;
                    }
                    None => debug!(user_id = user_id, "Flow already completed"),
                }
            }
        }

        Ok(CallbackOutcome::Handled)
    }
}

fn step_flow(
    flow: &FlowDefinition,
    state: &mut ConversationState,
    action: &FlowAction,
    message_id: Option<i32>,
) -> Transition {
    match action {
        FlowAction::Pick { step, value } => {
            if *step != state.step || !flow.accepts(*step, value) {
                return Transition::Stale;
            }
            let key = flow.steps[*step].key.as_str();
            state.add_data(key, value.as_str());
            state.add_breadcrumb(value);
            state.next_step();
            Transition::Prompt(build_prompt(flow, state, message_id), state.step)
        }
        FlowAction::Back { step } => {
            if *step >= state.step {
                return Transition::Stale;
            }
            for undone in &flow.steps[*step..state.step] {
                state.remove_data(&undone.key);
            }
            let base = breadcrumb_base(state);
            state.step = *step;
            state.truncate_breadcrumb(base + *step);
            Transition::Prompt(build_prompt(flow, state, message_id), state.step)
        }
        FlowAction::Confirm => {
            if state.step != flow.total_steps() {
                return Transition::Stale;
            }
            Transition::Confirm
        }
        FlowAction::Cancel => {
            state.reset();
            Transition::Cancelled(flow.command.clone())
        }
    }
}

/// Breadcrumb entries added at start: the title, plus the plugin if any
fn breadcrumb_base(state: &ConversationState) -> usize {
    if state.data.contains_key(PLUGIN_KEY) { 2 } else { 1 }
}

fn build_prompt(flow: &FlowDefinition, state: &ConversationState, message_id: Option<i32>) -> FlowPrompt {
    let stage = match flow.step(state.step) {
        Some(step) => FlowStage::Choose {
            step: state.step,
            total_steps: flow.total_steps(),
            key: step.key.clone(),
            label: step.label.clone(),
            options: step.options.clone(),
        },
        None => FlowStage::Confirm {
            total_steps: flow.total_steps(),
            params: state.summary_pairs(),
        },
    };

    FlowPrompt {
        user_id: state.user_id,
        message_id,
        command: flow.command.clone(),
        title: flow.title.clone(),
        breadcrumb: state.breadcrumb.clone(),
        stage,
    }
}

/// Turn a finished wizard into an execute request. The plugin entry becomes
/// `resolved_plugin`; the other values become params and raw args.
fn build_request(finished: ConversationState, command: String, message_id: Option<i32>) -> ExecuteRequest {
    let resolved_plugin = finished
        .get_str(PLUGIN_KEY)
        .and_then(|p| p.parse::<Plugin>().ok());

    let params: Map<_, _> = finished
        .data
        .into_iter()
        .filter(|(key, _)| key != PLUGIN_KEY)
        .collect();
    let raw_args = params
        .values()
        .map(crate::state::conversation::value_to_display)
        .collect::<Vec<_>>()
        .join(" ");

    let mut request = ExecuteRequest::new(finished.user_id, command, raw_args, resolved_plugin);
    request.params = params;
    request.message_id = message_id;
    request
}

/// Routes `flow_` callbacks into the engine
pub struct FlowCallbackHandler {
    engine: Arc<FlowEngine>,
}

impl FlowCallbackHandler {
    pub fn new(engine: Arc<FlowEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl CallbackHandler for FlowCallbackHandler {
    async fn handle(&self, event: &CallbackEvent, args: &str) -> Result<CallbackOutcome> {
        match FlowAction::parse(args) {
            Some(action) => self.engine.apply(event, action).await,
            None => Ok(CallbackOutcome::Unhandled),
        }
    }
}

/// Executor decorator: a command without arguments that has a wizard starts
/// the wizard; everything else goes straight to the wrapped executor.
pub struct FlowExecutor {
    engine: Arc<FlowEngine>,
}

impl FlowExecutor {
    pub fn new(engine: Arc<FlowEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Executor for FlowExecutor {
    async fn execute(&self, request: ExecuteRequest) -> Result<()> {
        if request.raw_args.trim().is_empty() && self.engine.start(&request).await? {
            return Ok(());
        }
        self.engine.executor.execute(request).await
    }
}
