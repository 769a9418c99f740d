//! Dispatcher root
//!
//! [`BotDispatcher`] owns the per-user state managers and serializes every
//! event per user: it holds the user's lock for the whole command or
//! callback, so a double-tap is processed strictly after the first tap while
//! other users proceed in parallel.

use std::sync::Arc;
use serde::Serialize;
use crate::config::Settings;
use crate::handlers::callbacks::{CallbackHandler, CallbackOutcome, CallbackRouter};
use crate::handlers::commands::{CommandInterceptor, CommandOutcome, CommandPipeline, CommandTable};
use crate::handlers::flow::{FlowCallbackHandler, FlowEngine, FlowExecutor};
use crate::models::{CallbackEvent, CommandEvent, FLOW_PREFIX};
use crate::services::{Executor, Renderer};
use crate::state::{ConversationStateManager, ConversationStats, FlowRegistry, PluginContextManager};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::errors::{TradePilotError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatcherStats {
    pub conversations: ConversationStats,
    pub active_contexts: usize,
}

pub struct BotDispatcher {
    states: Arc<ConversationStateManager>,
    contexts: Arc<PluginContextManager>,
    pipeline: Arc<CommandPipeline>,
    router: CallbackRouter,
}

impl BotDispatcher {
    pub fn builder(settings: Settings) -> DispatcherBuilder {
        DispatcherBuilder::new(settings)
    }

    /// Handle a slash-command
    pub async fn handle_command(&self, event: CommandEvent) -> Result<CommandOutcome> {
        let lock = self.states.get_lock(event.user_id);
        let _guard = lock.lock().await;
        self.pipeline.run(&event, None).await
    }

    /// Handle a button press
    pub async fn handle_callback(&self, event: CallbackEvent) -> Result<CallbackOutcome> {
        let lock = self.states.get_lock(event.user_id);
        let _guard = lock.lock().await;
        self.router.route(&event).await
    }

    pub fn states(&self) -> &Arc<ConversationStateManager> {
        &self.states
    }

    pub fn contexts(&self) -> &Arc<PluginContextManager> {
        &self.contexts
    }

    pub fn interceptor(&self) -> &CommandInterceptor {
        self.pipeline.interceptor()
    }

    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            conversations: self.states.stats(),
            active_contexts: self.contexts.active_count(),
        }
    }
}

/// Wires a [`BotDispatcher`] from settings and collaborators
pub struct DispatcherBuilder {
    settings: Settings,
    renderer: Option<Arc<dyn Renderer>>,
    executor: Option<Arc<dyn Executor>>,
    clock: Arc<dyn Clock>,
    flows: FlowRegistry,
    handlers: Vec<(String, Arc<dyn CallbackHandler>)>,
}

impl DispatcherBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            renderer: None,
            executor: None,
            clock: Arc::new(SystemClock),
            flows: FlowRegistry::new(),
            handlers: Vec::new(),
        }
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the built-in wizards
    pub fn flows(mut self, flows: FlowRegistry) -> Self {
        self.flows = flows;
        self
    }

    /// Route callbacks starting with `prefix` to `handler`
    pub fn callback_handler(mut self, prefix: &str, handler: Arc<dyn CallbackHandler>) -> Self {
        self.handlers.push((prefix.to_string(), handler));
        self
    }

    pub fn build(self) -> Result<BotDispatcher> {
        self.settings.validate()?;

        let renderer = self
            .renderer
            .ok_or_else(|| TradePilotError::Config("A renderer is required".to_string()))?;
        let executor = self
            .executor
            .ok_or_else(|| TradePilotError::Config("An executor is required".to_string()))?;

        let table = CommandTable::from_config(&self.settings.commands)?;
        let states = Arc::new(ConversationStateManager::new());
        let contexts = Arc::new(PluginContextManager::new(self.settings.context_expiry(), self.clock));

        let flow_engine = self.settings.flows.enabled.then(|| {
            Arc::new(FlowEngine::new(
                states.clone(),
                Arc::new(self.flows),
                renderer.clone(),
                executor.clone(),
            ))
        });
        let executor: Arc<dyn Executor> = match &flow_engine {
            Some(engine) => Arc::new(FlowExecutor::new(engine.clone())),
            None => executor,
        };

        let interceptor = CommandInterceptor::new(table, contexts.clone(), renderer.clone());
        let pipeline = Arc::new(CommandPipeline::new(
            interceptor,
            executor,
            self.settings.plugin_context.clear_after_execute,
        ));

        let mut router = CallbackRouter::new(pipeline.clone(), renderer, self.settings.callbacks.max_data_len);
        if let Some(engine) = flow_engine {
            router.register(FLOW_PREFIX, Arc::new(FlowCallbackHandler::new(engine)))?;
        }
        for (prefix, handler) in self.handlers {
            router.register(&prefix, handler)?;
        }

        Ok(BotDispatcher {
            states,
            contexts,
            pipeline,
            router,
        })
    }
}
